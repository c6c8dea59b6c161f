use console::style;

use super::Config;

#[inline]
pub fn show_config(config: &Config) {
    eprintln!("{}", style("Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Server:").bold().yellow());
    eprintln!("  Host: {}", style(&config.server.host).cyan());
    eprintln!("  Port: {}", style(config.server.port).cyan());

    eprintln!();
    eprintln!("{}", style("Fetching:").bold().yellow());
    eprintln!("  User Agent: {}", style(&config.fetch.user_agent).cyan());
    eprintln!(
        "  Timeout: {}s",
        style(config.fetch.timeout_seconds).cyan()
    );
    eprintln!(
        "  Delay Between Requests: {}ms",
        style(config.fetch.rate_limit_ms).cyan()
    );

    eprintln!();
    eprintln!("{}", style("Training:").bold().yellow());
    eprintln!("  Test Size: {}", style(config.training.test_size).cyan());
    eprintln!("  Seed: {}", style(config.training.seed).cyan());
    eprintln!("  Max Iterations: {}", style(config.training.max_iter).cyan());
    eprintln!("  Tolerance: {}", style(config.training.tolerance).cyan());
    eprintln!("  C: {}", style(config.training.c).cyan());

    eprintln!();
    eprintln!("{}", style("Topics:").bold().yellow());
    eprintln!("  Max Topics: {}", style(config.topics.max_topics).cyan());
    eprintln!("  Passes: {}", style(config.topics.passes).cyan());
    eprintln!(
        "  Min Probability: {}",
        style(config.topics.min_probability).cyan()
    );

    eprintln!();
    eprintln!("{}", style("Paths:").bold().yellow());
    eprintln!(
        "  Data: {}",
        style(config.paths.data_dir.display()).cyan()
    );
    eprintln!(
        "  Models: {}",
        style(config.paths.models_dir.display()).cyan()
    );
    eprintln!(
        "  Category Map: {}",
        style(config.paths.category_map.display()).cyan()
    );

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );
}
