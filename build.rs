fn main() {
    // The ESP-IDF environment only exists for device builds; host builds
    // (tests, trace replay) link against std alone.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }
}
