// RtLogPipeline - Build Script
//
// Exports the ESP-IDF environment when building for the device.

use std::env;

fn main() {
    // ESP-IDF environment setup (MUST be first on device builds!)
    if env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }

    println!("cargo:rerun-if-changed=build.rs");
}
