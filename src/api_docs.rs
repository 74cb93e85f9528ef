use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::storefront::dispatch,
        api::admin::dispatch,
        api::media::dispatch,
    ),
    tags(
        (name = "dealhub", description = "DealHub storefront, admin and media API")
    )
)]
pub struct ApiDoc;
