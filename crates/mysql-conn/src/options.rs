//! Connection descriptor.

use crate::error::{Error, Result};

/// Where and how to reach a MySQL server.
///
/// The descriptor is immutable once handed to a connector; it carries no
/// transport or authentication policy beyond the classic address, account,
/// and default schema.
///
/// ## Example
///
/// ```rust
/// use mysql_conn::ConnectOptions;
///
/// let opts = ConnectOptions::new("db1.internal:3306")
///     .user("app")
///     .password("secret")
///     .schema("orders");
/// assert_eq!(opts.addr, "db1.internal:3306");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Server address, `host:port`.
    pub addr: String,

    /// Account name.
    pub user: String,

    /// Account password.
    pub password: String,

    /// Default schema selected after authentication.
    pub schema: String,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            addr: "localhost:3306".to_string(),
            user: String::new(),
            password: String::new(),
            schema: String::new(),
        }
    }
}

impl ConnectOptions {
    /// Create a descriptor for the given `host:port` address.
    #[must_use]
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            ..Self::default()
        }
    }

    /// Parse a DSN of the form `user:password@host:port/schema`.
    ///
    /// The password and schema parts are optional:
    ///
    /// ```rust
    /// use mysql_conn::ConnectOptions;
    ///
    /// let opts = ConnectOptions::from_dsn("app:secret@db1:3306/orders").unwrap();
    /// assert_eq!(opts.user, "app");
    /// assert_eq!(opts.schema, "orders");
    ///
    /// let bare = ConnectOptions::from_dsn("root@localhost:3306").unwrap();
    /// assert!(bare.password.is_empty());
    /// ```
    pub fn from_dsn(dsn: &str) -> Result<Self> {
        let (credentials, rest) = dsn
            .split_once('@')
            .ok_or_else(|| Error::Config(format!("missing '@' in DSN: {dsn}")))?;

        let (user, password) = match credentials.split_once(':') {
            Some((user, password)) => (user, password),
            None => (credentials, ""),
        };
        if user.is_empty() {
            return Err(Error::Config(format!("missing user in DSN: {dsn}")));
        }

        let (addr, schema) = match rest.split_once('/') {
            Some((addr, schema)) => (addr, schema),
            None => (rest, ""),
        };
        if addr.is_empty() {
            return Err(Error::Config(format!("missing address in DSN: {dsn}")));
        }

        Ok(Self {
            addr: addr.to_string(),
            user: user.to_string(),
            password: password.to_string(),
            schema: schema.to_string(),
        })
    }

    /// Set the account name.
    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Set the account password.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Set the default schema.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }
}

// Manual Debug implementation so the password never reaches logs.
impl std::fmt::Debug for ConnectOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectOptions")
            .field("addr", &self.addr)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("schema", &self.schema)
            .finish()
    }
}
