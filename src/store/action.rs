use serde::Serialize;

use super::selectors::Location;
use crate::types::{GetHostPolicyResponse, HostInfo, HostResultList, IndexPattern, ServerApiError};

/// Everything that can change the host store. Serializes as
/// `{"type": "...", "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum HostAction {
    UserChangedUrl(Location),
    ServerReturnedHostList(HostResultList),
    ServerFailedToReturnHostList(ServerApiError),
    ServerReturnedHostDetails(HostInfo),
    ServerFailedToReturnHostDetails(ServerApiError),
    ServerReturnedHostPolicyResponse(GetHostPolicyResponse),
    ServerFailedToReturnHostPolicyResponse(ServerApiError),
    ServerReturnedMetadataPatterns(Vec<IndexPattern>),
    /// Raw (still encoded) search bar query from the URL
    UserUpdatedSearchBarQuery(Option<String>),
}

impl HostAction {
    pub fn type_name(&self) -> &'static str {
        match self {
            HostAction::UserChangedUrl(_) => "userChangedUrl",
            HostAction::ServerReturnedHostList(_) => "serverReturnedHostList",
            HostAction::ServerFailedToReturnHostList(_) => "serverFailedToReturnHostList",
            HostAction::ServerReturnedHostDetails(_) => "serverReturnedHostDetails",
            HostAction::ServerFailedToReturnHostDetails(_) => "serverFailedToReturnHostDetails",
            HostAction::ServerReturnedHostPolicyResponse(_) => "serverReturnedHostPolicyResponse",
            HostAction::ServerFailedToReturnHostPolicyResponse(_) => {
                "serverFailedToReturnHostPolicyResponse"
            }
            HostAction::ServerReturnedMetadataPatterns(_) => "serverReturnedMetadataPatterns",
            HostAction::UserUpdatedSearchBarQuery(_) => "userUpdatedSearchBarQuery",
        }
    }
}
