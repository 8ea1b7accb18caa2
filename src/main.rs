mod cmdline;
mod driver;

fn main() -> rtlgen_utils::RtlResult<()> {
    driver::run_generator()
}
