fn main() {
    println!("cargo:rerun-if-env-changed=TICKERVIEW_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=TICKERVIEW_WIFI_PASSWD");
    println!("cargo:rerun-if-env-changed=TICKERVIEW_AP_PASSWD");
    println!("cargo:rerun-if-env-changed=TICKERVIEW_WEB_USER");
    println!("cargo:rerun-if-env-changed=TICKERVIEW_WEB_PASSWD");

    // ESP-IDF link arguments are only needed for the device build.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
