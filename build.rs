fn main() {
    // Forward the ESP-IDF sysenv to rustc only for device builds; host
    // test builds (--no-default-features) have no IDF environment.
    if std::env::var("CARGO_FEATURE_ESPIDF").is_ok() {
        embuild::espidf::sysenv::output();
    }
}
