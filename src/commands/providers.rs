//! Providers command implementation.

use crate::provider::Provider;

/// Run the providers command
pub fn run() {
    println!();
    println!("{:<16} {:<40} DNSSEC", "NAME", "TLS HOST");
    for provider in Provider::ALL {
        let data = provider.data();
        println!(
            "{:<16} {:<40} {}",
            provider.name(),
            format!("{}:{}", data.host, data.port),
            if provider.supports_dnssec() { "yes" } else { "no" }
        );
    }
    println!();
}
