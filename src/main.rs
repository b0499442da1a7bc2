use anyhow::Result;

fn main() -> Result<()> {
    chat_thread_filter::cli::run()
}
