//! Supported language listing.

use console::style;

use nyaya::LanguageCode;

pub fn cmd_languages() {
    println!("\n{}", style("Supported Languages").bold());
    println!("{}", "-".repeat(30));
    for lang in LanguageCode::ALL {
        println!("  {:<6} {}", style(lang.code()).cyan(), lang.display_name());
    }
    println!();
}
