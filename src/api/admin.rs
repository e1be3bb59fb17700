use log::debug;
use rocket::{serde::json::Json, Route, State};

use crate::error::Result;
use crate::logging::RequestId;
use crate::model::{api::CreatedElection, auth::AuthToken, election::ElectionSpec};
use crate::store::Store;

pub fn routes() -> Vec<Route> {
    routes![create_election]
}

#[post("/elections", data = "<spec>", format = "json")]
async fn create_election(
    token: AuthToken,
    spec: Json<ElectionSpec>,
    store: &State<Store>,
    request_id: &RequestId,
) -> Result<Json<CreatedElection>> {
    debug!(
        "req{request_id}: {} creating election \"{}\"",
        token.identity(),
        spec.name
    );
    let id = store
        .create_election(token.identity(), spec.into_inner())
        .await?;
    Ok(Json(CreatedElection { id }))
}
