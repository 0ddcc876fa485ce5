mod platform;

fn main() -> Result<(), platform::AppError> {
    platform::run_app()
}
