use log::debug;
use rocket::{serde::json::Json, Route, State};

use crate::error::Result;
use crate::logging::RequestId;
use crate::model::{api::VoteRequest, auth::AuthToken, common::election::ElectionId};
use crate::store::Store;

pub fn routes() -> Vec<Route> {
    routes![cast_vote]
}

#[post("/elections/<election_id>/votes", data = "<vote>", format = "json")]
async fn cast_vote(
    token: AuthToken,
    election_id: ElectionId,
    vote: Json<VoteRequest>,
    store: &State<Store>,
    request_id: &RequestId,
) -> Result<()> {
    debug!(
        "req{request_id}: {} voting in election {election_id}",
        token.identity()
    );
    store
        .vote(token.identity(), election_id, vote.candidate_id)
        .await
}
