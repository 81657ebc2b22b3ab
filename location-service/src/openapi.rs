use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::WeatherLookup;
use crate::handlers;
use common::models::{
    HistoricalRecord, HistoryResponse, HistorySummary, Location, LocationUpdate, MessageResponse,
    NewLocation, WeatherSnapshot,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::list_locations,
        handlers::create_location,
        handlers::get_location,
        handlers::update_location,
        handlers::delete_location,
    ),
    components(schemas(
        Location,
        NewLocation,
        LocationUpdate,
        MessageResponse,
        WeatherSnapshot,
        HistoricalRecord,
        HistorySummary,
        HistoryResponse,
    )),
    tags(
        (name = "locations", description = "Location management"),
        (name = "weather", description = "Current weather"),
        (name = "history", description = "Recorded weather observations"),
    ),
)]
struct ApiDoc;

#[derive(OpenApi)]
#[openapi(paths(handlers::get_weather_by_id, handlers::get_history))]
struct CoordinateWeatherDoc;

#[derive(OpenApi)]
#[openapi(paths(handlers::get_weather_by_name))]
struct NameWeatherDoc;

pub fn api_doc(lookup: WeatherLookup) -> utoipa::openapi::OpenApi {
    let weather = match lookup {
        WeatherLookup::Coordinates => CoordinateWeatherDoc::openapi(),
        WeatherLookup::Name => NameWeatherDoc::openapi(),
    };
    ApiDoc::openapi().merge_from(weather)
}

pub fn swagger_ui(lookup: WeatherLookup) -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api_doc(lookup))
}
