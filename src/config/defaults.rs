use std::time::Duration;

pub(super) const fn default_connect_timeout() -> Duration {
    Duration::from_secs(5)
}

pub(super) const fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}
