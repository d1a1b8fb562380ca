use metrics::counter;

/// Track pacer send metrics
pub mod sends {
    use super::*;

    pub fn packet_sent() {
        counter!("packets_sent_total", 1);
    }

    pub fn tick() {
        counter!("ticks_total", 1);
    }
}
