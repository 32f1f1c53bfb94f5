//! Built-in tool handlers for datadesk.
//!
//! Tools give the agent read access to its data:
//! employee and product records, country and currency reference tables
//! (all CSV files), plus current weather and live exchange rates from
//! public REST APIs.
//!
//! Every handler takes its configuration (file path, base URL, HTTP client)
//! in its constructor. Nothing is global.

mod args;
pub mod columns;
pub mod exchange_rate;
pub mod http;
pub mod records;
pub mod table;
pub mod weather;

use std::sync::Arc;

use datadesk_config::AppConfig;
use datadesk_core::error::ToolError;
use datadesk_core::tool::ToolRegistry;

pub use columns::ColumnFilterTool;
pub use exchange_rate::{ExchangeRateTool, RateMode};
pub use http::HttpBackend;
pub use records::{EMPLOYEES, PRODUCTS, RecordKind, RecordLookupTool};
pub use weather::WeatherTool;

/// Create the registry of all seven built-in tools.
///
/// Registration order is fixed, so the tool list sent to the model is the
/// same on every run.
pub fn default_registry(config: &AppConfig) -> Result<ToolRegistry, ToolError> {
    let data = &config.data;
    let endpoints = &config.endpoints;
    let http = HttpBackend::from_config(endpoints);

    let employees = RecordLookupTool::new(EMPLOYEES, data.employees_path());
    let products = RecordLookupTool::new(PRODUCTS, data.products_path());
    let countries = ColumnFilterTool::countries(data.countries_path());
    let currency = ColumnFilterTool::currency_by_country(data.country_currency_path());
    let rate = ExchangeRateTool::new(http.clone(), endpoints, RateMode::Lookup);
    let convert = ExchangeRateTool::new(http.clone(), endpoints, RateMode::Convert);
    let weather = WeatherTool::new(http, endpoints);

    let mut registry = ToolRegistry::new();
    registry.register(employees.spec(), Arc::new(employees))?;
    registry.register(products.spec(), Arc::new(products))?;
    registry.register(countries.spec(), Arc::new(countries))?;
    registry.register(currency.spec(), Arc::new(currency))?;
    registry.register(rate.spec(), Arc::new(rate))?;
    registry.register(convert.spec(), Arc::new(convert))?;
    registry.register(WeatherTool::spec(), Arc::new(weather))?;
    Ok(registry)
}
