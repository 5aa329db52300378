fn main() -> anyhow::Result<()> {
    handtrace_lib::run()
}
