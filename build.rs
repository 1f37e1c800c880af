fn main() {
    println!("cargo:rerun-if-env-changed=SUMPCTL_CONFIG_JSON");

    // Only firmware builds need the ESP-IDF link environment.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
