mod args;
mod entry;
mod logger;
mod shutdown_handlers;

use courier::error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
