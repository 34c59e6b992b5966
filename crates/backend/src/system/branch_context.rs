use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use contracts::shared::branch_scope::SelectedBranches;

/// Header carrying the caller's branch selection as a comma-separated id list
pub const SELECTED_BRANCHES_HEADER: &str = "X-Selected-Branches";

/// Extractor for the caller's branch selection.
/// A missing or blank header means every branch.
/// Usage in handlers: `async fn handler(SelectedBranchesHeader(selected): SelectedBranchesHeader)`
pub struct SelectedBranchesHeader(pub SelectedBranches);

#[async_trait]
impl<S> FromRequestParts<S> for SelectedBranchesHeader
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.headers.get(SELECTED_BRANCHES_HEADER) {
            None => Ok(SelectedBranchesHeader(SelectedBranches::all())),
            Some(value) => value
                .to_str()
                .map(|raw| SelectedBranchesHeader(SelectedBranches::parse_list(raw)))
                .map_err(|_| StatusCode::BAD_REQUEST),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use contracts::shared::branch_scope::BranchRef;

    async fn extract(req: Request<()>) -> Result<SelectedBranches, StatusCode> {
        let (mut parts, _) = req.into_parts();
        SelectedBranchesHeader::from_request_parts(&mut parts, &())
            .await
            .map(|h| h.0)
    }

    #[tokio::test]
    async fn test_missing_header_selects_all() {
        let selected = extract(Request::new(())).await.unwrap();
        assert!(selected.is_empty());
    }

    #[tokio::test]
    async fn test_header_ids_are_normalized() {
        let req = Request::builder()
            .header(SELECTED_BRANCHES_HEADER, "01, 3")
            .body(())
            .unwrap();
        let selected = extract(req).await.unwrap();
        assert!(selected.contains(&BranchRef::from_number(1)));
        assert!(selected.contains(&BranchRef::from_number(3)));
        assert!(!selected.contains(&BranchRef::from_number(2)));
    }
}
