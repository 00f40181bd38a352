fn main() -> std::process::ExitCode {
    craftpacker_lib::run()
}
