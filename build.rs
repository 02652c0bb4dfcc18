fn main() {
    // Emits the ESP-IDF toolchain/link environment for cross builds.
    // On host builds (tests) the environment is absent and this is a no-op.
    embuild::espidf::sysenv::output();
}
