//! Inspect a Reddit account's analytics without going through the API

use anyhow::{Context, Result};
use clap::Parser;

use simfluence_reddit::{RedditAnalytics, RedditClient, DEFAULT_BASE_URL};

#[derive(Parser, Debug)]
pub struct RedditArgs {
    /// Reddit username (without the u/ prefix)
    pub username: String,

    /// OAuth access token
    #[arg(long, env = "REDDIT_ACCESS_TOKEN", hide_env_values = true)]
    pub token: String,

    /// API host
    #[arg(long, env = "REDDIT_API_BASE", default_value = DEFAULT_BASE_URL)]
    pub api_base: String,

    /// Print raw JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

pub async fn run_reddit(args: RedditArgs) -> Result<()> {
    let username = args.username.trim_start_matches("u/");
    let client = RedditClient::with_base_url(&args.api_base, &args.token);

    let analytics = client
        .user_analytics(username)
        .await
        .with_context(|| format!("Failed to fetch analytics for u/{}", username))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analytics)?);
    } else {
        print!("{}", render(&analytics));
    }
    Ok(())
}

fn render(a: &RedditAnalytics) -> String {
    format!(
        "u/{name} ({id}){verified}\n\
         \x20 karma:           {karma} ({posts_karma} post / {comment_karma} comment)\n\
         \x20 account age:     {age} days\n\
         \x20 recent posts:    {total}\n\
         \x20 avg upvotes:     {up}\n\
         \x20 avg comments:    {com}\n\
         \x20 engagement rate: {rate:.2}\n",
        name = a.reddit_username,
        id = a.reddit_id,
        verified = if a.verified { " ✓ verified" } else { "" },
        karma = a.reddit_karma,
        posts_karma = a.total_post_karma,
        comment_karma = a.comment_karma,
        age = a.reddit_account_age,
        total = a.total_posts,
        up = a.average_upvotes,
        com = a.average_comments,
        rate = a.engagement_rate,
    )
}
