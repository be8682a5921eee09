use routine_studio::entry;
use routine_studio::error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
