//! Data source name parsing.
//!
//! Accepts either a `postgres://` URL or a libpq keyword/value string such as
//! `host=/tmp port=6432 user=pgbouncer dbname=pgbouncer`.

use sqlx::postgres::{PgConnectOptions, PgSslMode};

/// Parse a DSN into connect options tuned for the admin console.
///
/// The admin console rejects unknown startup parameters and only speaks the
/// simple query protocol, so `extra_float_digits` is never sent and the
/// statement cache is disabled.
pub fn parse_dsn(dsn: &str) -> Result<PgConnectOptions, sqlx::Error> {
    let dsn = dsn.trim();
    let options = if dsn.starts_with("postgres://") || dsn.starts_with("postgresql://") {
        dsn.parse::<PgConnectOptions>()?
    } else {
        parse_keywords(dsn)?
    };
    Ok(options.extra_float_digits(None::<i8>).statement_cache_capacity(0))
}

fn parse_keywords(dsn: &str) -> Result<PgConnectOptions, sqlx::Error> {
    let mut options = PgConnectOptions::new_without_pgpass();
    for (key, value) in split_pairs(dsn)? {
        options = match key.as_str() {
            "host" | "hostaddr" if value.starts_with('/') => options.socket(value),
            "host" | "hostaddr" => options.host(&value),
            "port" => options.port(
                value
                    .parse()
                    .map_err(|_| config_error(format!("invalid port `{value}`")))?,
            ),
            "user" => options.username(&value),
            "password" => options.password(&value),
            "dbname" => options.database(&value),
            // "disabled" appears in older exporter docs; libpq spells it "disable".
            "sslmode" if value == "disabled" => options.ssl_mode(PgSslMode::Disable),
            "sslmode" => options.ssl_mode(value.parse()?),
            "sslrootcert" => options.ssl_root_cert(value),
            "application_name" => options.application_name(&value),
            other => return Err(config_error(format!("unsupported DSN keyword `{other}`"))),
        };
    }
    Ok(options)
}

/// Split `k=v k2='v 2'` into pairs. Single quotes and backslash escapes
/// follow libpq rules.
fn split_pairs(dsn: &str) -> Result<Vec<(String, String)>, sqlx::Error> {
    let mut pairs = Vec::new();
    let mut chars = dsn.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.peek().is_none() {
            break;
        }

        let mut key = String::new();
        while let Some(c) = chars.next_if(|c| *c != '=' && !c.is_whitespace()) {
            key.push(c);
        }
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.next() != Some('=') {
            return Err(config_error(format!("missing `=` after DSN keyword `{key}`")));
        }
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let mut value = String::new();
        if chars.next_if_eq(&'\'').is_some() {
            loop {
                match chars.next() {
                    Some('\\') => match chars.next() {
                        Some(c) => value.push(c),
                        None => return Err(config_error("unterminated quoted DSN value")),
                    },
                    Some('\'') => break,
                    Some(c) => value.push(c),
                    None => return Err(config_error("unterminated quoted DSN value")),
                }
            }
        } else {
            while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        value.push(escaped);
                    }
                } else {
                    value.push(c);
                }
            }
        }

        pairs.push((key, value));
    }

    Ok(pairs)
}

fn config_error(msg: impl Into<String>) -> sqlx::Error {
    sqlx::Error::Configuration(msg.into().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pairs() {
        let pairs = split_pairs("host=/tmp  port = 6432 password='se cr\\'et'").unwrap();
        assert_eq!(
            pairs,
            vec![
                ("host".to_string(), "/tmp".to_string()),
                ("port".to_string(), "6432".to_string()),
                ("password".to_string(), "se cr'et".to_string()),
            ]
        );
    }

    #[test]
    fn test_split_pairs_rejects_bare_keyword() {
        assert!(split_pairs("host").is_err());
        assert!(split_pairs("password='open").is_err());
    }

    #[test]
    fn test_parse_keyword_dsn() {
        let options =
            parse_dsn("host=localhost port=6432 user=pgbouncer dbname=pgbouncer sslmode=disabled")
                .unwrap();
        assert_eq!(options.get_host(), "localhost");
        assert_eq!(options.get_port(), 6432);
        assert_eq!(options.get_username(), "pgbouncer");
        assert_eq!(options.get_database(), Some("pgbouncer"));
    }

    #[test]
    fn test_parse_url_dsn() {
        let options = parse_dsn("postgres://stats@db.internal:6433/pgbouncer?sslmode=disable").unwrap();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6433);
        assert_eq!(options.get_username(), "stats");
    }

    #[test]
    fn test_parse_dsn_errors() {
        assert!(parse_dsn("port=abc").is_err());
        assert!(parse_dsn("colour=blue").is_err());
        assert!(parse_dsn("sslmode=sometimes").is_err());
    }
}
