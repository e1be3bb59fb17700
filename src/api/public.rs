use rocket::{serde::json::Json, Route, State};

use crate::error::Result;
use crate::model::{
    auth::AuthToken,
    common::election::ElectionId,
    election::{ElectionSummary, ElectionView},
};
use crate::store::Store;

pub fn routes() -> Vec<Route> {
    routes![elections, election]
}

/// Every election the caller is involved in, oldest first.
#[get("/elections")]
async fn elections(token: AuthToken, store: &State<Store>) -> Result<Json<Vec<ElectionSummary>>> {
    let summaries = store.elections(token.identity()).await?;
    Ok(Json(summaries))
}

#[get("/elections/<election_id>")]
async fn election(
    token: AuthToken,
    election_id: ElectionId,
    store: &State<Store>,
) -> Result<Json<ElectionView>> {
    let view = store.election_details(token.identity(), election_id).await?;
    Ok(Json(view))
}
