use crate::domain::errors::FetchError;
use async_trait::async_trait;
use serde_json::Value;

/// One admin API request: a resource path below the admin entry plus its
/// query arguments, in the order they are sent.
///
/// A bare flag such as `list` or `quota` is an argument with an empty value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AdminQuery {
    pub resource: String,
    pub args: Vec<(String, String)>,
}

impl AdminQuery {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.push((key.into(), value.into()));
        self
    }

    pub fn flag(self, key: impl Into<String>) -> Self {
        self.arg(key, "")
    }

    /// `usage?show-summary=True`
    pub fn usage_summary() -> Self {
        Self::new("usage").arg("show-summary", "True")
    }

    /// `bucket?stats=True`
    pub fn bucket_stats() -> Self {
        Self::new("bucket").arg("stats", "True")
    }

    /// `user?list`
    pub fn user_list() -> Self {
        Self::new("user").flag("list")
    }

    /// `metadata/user`, the user listing of gateways older than 12.2.13/13.2.9
    pub fn metadata_users() -> Self {
        Self::new("metadata/user")
    }

    /// `user?quota&uid=<uid>&quota-type=user`
    pub fn user_quota(uid: &str) -> Self {
        Self::new("user")
            .flag("quota")
            .arg("uid", uid)
            .arg("quota-type", "user")
    }

    /// `user?uid=<uid>&stats=True`
    pub fn user_info(uid: &str) -> Self {
        Self::new("user").arg("uid", uid).arg("stats", "True")
    }

    /// Arguments as sent on the wire, `format=json` first.
    pub fn wire_args(&self) -> Vec<(&str, &str)> {
        std::iter::once(("format", "json"))
            .chain(self.args.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .collect()
    }
}

impl std::fmt::Display for AdminQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.resource)?;
        for (i, (k, v)) in self.args.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            if v.is_empty() {
                write!(f, "{}{}", sep, k)?;
            } else {
                write!(f, "{}{}={}", sep, k, v)?;
            }
        }
        Ok(())
    }
}

/// Privileged gateway endpoint the exporter polls.
///
/// Implementations report every failure (transport, HTTP status, body
/// decoding) as a [`FetchError`] and never panic.
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn fetch(&self, query: &AdminQuery) -> Result<Value, FetchError>;
}
