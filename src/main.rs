use flight_routes::config::ClientConfig;
use flight_routes::models::{NewRoute, RoutePatch};
use flight_routes::services::{
    Authenticator, Credentials, FlightStore, HttpTransport, StaticAuthenticator, Transport,
};
use flight_routes::{NoticeBus, RouteStore};
use serde_json::Value;
use std::env;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn print_help() {
    eprintln!(
        "\
Usage: flight-routes <COMMAND> [OPTIONS]

Commands:
  list                          Fetch and print all routes
  create --origin=X --destination=Y [--field=KEY:VALUE]...
                                Create a route (admin)
  update <ID> [--origin=X] [--destination=Y] [--field=KEY:VALUE]...
                                Update a route (admin)
  delete <ID>                   Delete a route not used by any flight (admin)

Options:
  --json                        Print routes as JSON
  --help                        Show this help message

Environment:
  API_BASE_URL, API_TIMEOUT_SECS, API_TOKEN, API_IS_ADMIN"
    );
}

/// `KEY:VALUE`; the value is parsed as JSON when possible, else kept as a string.
fn parse_field(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("Invalid --field '{}', expected KEY:VALUE", raw))?;
    if key.is_empty() {
        return Err(format!("Invalid --field '{}', empty key", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn option<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    let prefix = format!("--{}=", name);
    args.iter().find_map(|a| a.strip_prefix(prefix.as_str()))
}

fn fields(args: &[String]) -> Result<Vec<(String, Value)>, String> {
    args.iter()
        .filter_map(|a| a.strip_prefix("--field="))
        .map(parse_field)
        .collect()
}

/// Plain strings as-is, structured values as compact JSON.
fn endpoint_label(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "?".to_string(),
    }
}

fn positional(args: &[String]) -> Option<&str> {
    args.iter().skip(2).find(|a| !a.starts_with("--")).map(String::as_str)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flight_routes=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = env::args().collect();
    let Some(command) = args.get(1).map(String::as_str) else {
        print_help();
        return Ok(());
    };

    if args.iter().any(|a| a == "--help") {
        print_help();
        return Ok(());
    }

    let config =
        ClientConfig::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;
    tracing::debug!(base_url = %config.api_base_url, "Configuration loaded");

    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::from_config(&config)?);
    let auth: Arc<dyn Authenticator> = match config.api_token.clone() {
        Some(token) => Arc::new(StaticAuthenticator::new(Credentials {
            token,
            user_id: env::var("USER").unwrap_or_else(|_| "cli".to_string()),
            is_admin: config.is_admin,
        })),
        None => Arc::new(StaticAuthenticator::anonymous()),
    };
    let flights = Arc::new(FlightStore::new(transport.clone()));
    let notices = NoticeBus::new(config.notice_channel_capacity);
    let store = RouteStore::new(transport, auth, flights).with_notices(notices.clone());

    let mut notice_rx = notices.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(notice) = notice_rx.recv().await {
            eprintln!("{}", notice);
        }
    });

    match command {
        "list" => store.refresh().await,
        "create" => {
            let (Some(origin), Some(destination)) =
                (option(&args, "origin"), option(&args, "destination"))
            else {
                return Err("create requires --origin and --destination".into());
            };
            let mut new_route = NewRoute::new(origin, destination);
            for (key, value) in fields(&args)? {
                new_route = new_route.with_field(key, value);
            }
            store.refresh().await;
            store.create(new_route).await;
        }
        "update" => {
            let id = positional(&args).ok_or("update requires a route ID")?;
            let mut patch = RoutePatch::default();
            if let Some(origin) = option(&args, "origin") {
                patch = patch.origin(origin);
            }
            if let Some(destination) = option(&args, "destination") {
                patch = patch.destination(destination);
            }
            for (key, value) in fields(&args)? {
                patch = patch.with_field(key, value);
            }
            if patch.is_empty() {
                return Err("update requires at least one field to change".into());
            }
            store.refresh().await;
            store.update(id, patch).await;
        }
        "delete" => {
            let id = positional(&args).ok_or("delete requires a route ID")?;
            store.refresh().await;
            store.delete(id).await;
        }
        other => {
            print_help();
            return Err(format!("Unknown command '{}'", other).into());
        }
    }

    let state = store.snapshot();
    if args.iter().any(|a| a == "--json") {
        println!("{}", serde_json::to_string_pretty(&state.routes)?);
    } else {
        for route in &state.routes {
            println!(
                "{:<26} {:<12} -> {}",
                route.id,
                endpoint_label(route.origin.as_ref()),
                endpoint_label(route.destination.as_ref())
            );
        }
    }

    // Closing the bus ends the printer once queued notices are drained
    drop(store);
    drop(notices);
    let _ = printer.await;

    match state.error {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}
