//! typed operation helper
//!
//! operation trait for fixed queries with a known response shape.

use serde::de::DeserializeOwned;

/// graphql operation contract for typed call sites
///
/// ```
/// use gqlpipe::Operation;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Account {
///     id: i64,
/// }
///
/// #[derive(Deserialize)]
/// struct AccountData {
///     account: Account,
/// }
///
/// struct GetAccount;
///
/// impl Operation for GetAccount {
///     const QUERY: &'static str = "query GetAccount($id: ID!) { account(id: $id) { id } }";
///     const OPERATION_NAME: Option<&'static str> = Some("GetAccount");
///     type Response = AccountData;
/// }
/// ```
pub trait Operation {
    /// graphql query or mutation string
    const QUERY: &'static str;
    /// operation name sent alongside the query
    const OPERATION_NAME: Option<&'static str> = None;
    /// response payload type
    type Response: DeserializeOwned;
}
