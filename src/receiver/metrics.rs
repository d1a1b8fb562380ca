use metrics::counter;

/// Track UDP metrics
pub mod udp {
    use super::*;

    pub fn datagram_received() {
        counter!("datagrams_received_total", 1);
    }
}
