use ipecho::{HeaderMap, IpResolver, ResolvePolicy, normalize, resolve_ip};

fn main() {
    println!("=== Client IP Resolution Examples ===\n");

    // Example 1: Normalizing raw addresses
    example_1_normalize();

    // Example 2: X-Forwarded-For with multiple hops
    example_2_x_forwarded_for();

    // Example 3: Fallback to the remote address
    example_3_fallback();

    // Example 4: Reporting every source
    example_4_all_sources();

    // Example 5: Only trusting a known proxy
    example_5_trusted_proxy();

    println!("=== All examples completed! ===");
}

fn example_1_normalize() {
    println!("Example 1: Normalizing raw addresses");

    for raw in ["1.2.3.4:5678", "[::1]:9999", "::ffff:192.0.2.7", "2001:db8::1", "not-an-ip"] {
        println!("  {raw:<20} -> {}", normalize(raw));
    }
    println!();
}

fn example_2_x_forwarded_for() {
    println!("Example 2: X-Forwarded-For with multiple hops");

    let mut headers = HeaderMap::new();
    headers.insert(
        "x-forwarded-for".to_string(),
        "203.0.113.1, 192.168.1.10, 10.0.0.5".to_string(),
    );

    println!("Resolved IP (first in chain): {}", resolve_ip(&headers, "10.0.0.5:443").ip());
    println!();
}

fn example_3_fallback() {
    println!("Example 3: Fallback to the remote address");

    let headers = HeaderMap::new();
    println!("Resolved IP: {}", resolve_ip(&headers, "192.0.2.123:51000").ip());
    println!();
}

fn example_4_all_sources() {
    println!("Example 4: Reporting every source");

    let mut headers = HeaderMap::new();
    headers.insert("x-forwarded-for".to_string(), "198.51.100.1".to_string());
    headers.insert("x-real-ip".to_string(), "198.51.100.2".to_string());

    let resolver = IpResolver::new().with_policy(ResolvePolicy::AllSources);
    print!("{}", resolver.resolve(&headers, "[::1]:40000").to_text());
    println!();
}

fn example_5_trusted_proxy() {
    println!("Example 5: Only trusting a known proxy");

    let mut headers = HeaderMap::new();
    headers.insert("x-real-ip".to_string(), "198.51.100.7".to_string());

    let resolver = IpResolver::new().with_trusted_proxies(vec!["10.0.0.1".parse().unwrap()]);
    println!(
        "From trusted proxy:   {}",
        resolver.resolve(&headers, "10.0.0.1:5000").ip()
    );
    println!(
        "From untrusted peer:  {}",
        resolver.resolve(&headers, "192.0.2.50:5000").ip()
    );
    println!();
}
