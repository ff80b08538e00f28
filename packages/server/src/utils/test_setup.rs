use dotenvy::dotenv;
use std::sync::Once;

static INIT: Once = Once::new();

pub fn setup_test_env() {
    INIT.call_once(|| {
        dotenv().ok();
        // テストではファイルに書かない
        std::env::set_var("MAFIA_STORE", "memory");
        if std::env::var("MAFIA_NIGHT_VOTES_MAFIA_ONLY").is_err() {
            std::env::set_var("MAFIA_NIGHT_VOTES_MAFIA_ONLY", "true");
        }
        let _ = env_logger::builder().is_test(true).try_init();
    });
}
