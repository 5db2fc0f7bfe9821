//! Run one search and print schema-complete records as JSON lines.
//!
//! ```sh
//! LDAP_SERVER=ldaps://ldap.example.com \
//! LDAP_BASEDN="dc=example,dc=com" \
//! LDAP_FILTER="(objectClass=person)" \
//! cargo run --example basic_search
//! ```

use ldaptab::{ConnectionSpec, DirectoryClient, SearchSpec};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ldaptab::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let server = std::env::var("LDAP_SERVER").unwrap_or_else(|_| "ldap://localhost:389".into());
    let basedn = std::env::var("LDAP_BASEDN").unwrap_or_else(|_| "dc=example,dc=com".into());

    let mut conn = ConnectionSpec::new(server);
    if let (Ok(dn), Ok(password)) = (std::env::var("LDAP_BINDDN"), std::env::var("LDAP_PASSWORD"))
    {
        conn = conn.bind(dn, password);
    }

    let mut search = SearchSpec::new(basedn);
    if let Ok(filter) = std::env::var("LDAP_FILTER") {
        search = search.filter(filter);
    }
    if let Ok(attrs) = std::env::var("LDAP_ATTRS") {
        search = search.attributes_from_str(&attrs);
    }

    let client = DirectoryClient::connect(&conn).await?;
    let records = client.search(&search).await?;

    eprintln!(
        "schema: {} fields across {} records",
        records.universe().len(),
        records.len()
    );

    for record in records {
        println!(
            "{}",
            serde_json::to_string(&record).expect("record serializes")
        );
    }

    Ok(())
}
