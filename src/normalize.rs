use std::net::IpAddr;

/// Canonicalize a raw address string to its bare-IP textual form.
///
/// Accepts a bare IP, `host:port`, or `[v6]:port`. The port is stripped,
/// IPv4-mapped IPv6 addresses collapse to dotted-decimal and the IPv6
/// loopback `::1` is reported as `127.0.0.1`. Anything that does not parse
/// as an IP is returned unchanged.
///
/// # Examples
///
/// ```rust
/// use ipecho::normalize;
///
/// assert_eq!(normalize("1.2.3.4:5678"), "1.2.3.4");
/// assert_eq!(normalize("[::1]:9999"), "127.0.0.1");
/// assert_eq!(normalize("not-an-ip"), "not-an-ip");
/// ```
pub fn normalize(raw: &str) -> String {
    let host = split_host_port(raw).unwrap_or(raw);

    let ip = match host.parse::<IpAddr>() {
        Ok(ip) => ip,
        Err(_) => return raw.to_string(),
    };

    match ip {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => {
            if let Some(v4) = v6.to_ipv4_mapped() {
                v4.to_string()
            } else if v6.is_loopback() {
                // localhost over v6 reads the same as over v4
                "127.0.0.1".to_string()
            } else {
                v6.to_string()
            }
        }
    }
}

/// Split `host:port` or `[host]:port`, returning the host part.
///
/// Returns `None` when there is no port, or when an unbracketed host
/// contains more than one colon (a bare IPv6 address).
fn split_host_port(raw: &str) -> Option<&str> {
    if let Some(rest) = raw.strip_prefix('[') {
        let end = rest.find(']')?;
        let (host, tail) = rest.split_at(end);
        // tail starts with ']'
        let port = tail[1..].strip_prefix(':')?;
        if port.contains([':', '[', ']']) || host.contains('[') {
            return None;
        }
        return Some(host);
    }

    let colon = raw.rfind(':')?;
    let host = &raw[..colon];
    if host.contains(':') || host.contains('[') || host.contains(']') {
        return None;
    }
    Some(host)
}
