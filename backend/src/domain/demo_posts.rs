//! Seed posts for local development against the in-memory store.
//!
//! Each post exercises a different part of the renderer: plain markdown,
//! images, an embedded video, audio, and tables.

use chrono::{DateTime, Duration, Utc};

use super::{Error, Post, PostId, UserId};

/// Author of every demo post.
pub const DEMO_AUTHOR: &str = "31b78f13-bb9f-44bc-96b5-21dae295d537";

struct DemoPost {
    title: &'static str,
    content: &'static str,
    hours_ago: i64,
}

const DEMO_POSTS: [DemoPost; 6] = [
    DemoPost {
        title: "Markdown basics",
        content: "# First post\n\n\
            A short tour of what the editor understands:\n\n\
            - **bold** and *italic*\n\
            - ~~strikethrough~~\n\
            - `inline code`\n\n\
            > Quotes stand out.\n\n\
            ```rust\nfn main() {\n    println!(\"hello\");\n}\n```",
        hours_ago: 2,
    },
    DemoPost {
        title: "Photos from the ridge",
        content: "# Up the ridge\n\n\
            ![Mountain landscape](https://images.unsplash.com/photo-1506905925346-21bda4d32df4?w=800)\n\n\
            ![Ocean at dusk](https://images.unsplash.com/photo-1507525428034-b723cf961d3e?w=800)\n\n\
            *Images from Unsplash.*",
        hours_ago: 4,
    },
    DemoPost {
        title: "A video worth watching",
        content: "# Embedded video\n\n\
            <iframe width=\"560\" height=\"315\" \
            src=\"https://www.youtube.com/embed/dQw4w9WgXcQ\" \
            title=\"YouTube video player\" \
            allow=\"accelerometer; autoplay; encrypted-media; picture-in-picture\" \
            allowfullscreen></iframe>\n\n\
            Attributes outside the embed allow-list are dropped when rendering.",
        hours_ago: 6,
    },
    DemoPost {
        title: "Podcast episode",
        content: "# Episode notes\n\n\
            <audio controls>\n\
            <source src=\"https://www2.cs.uic.edu/~i101/SoundFiles/CantinaBand3.wav\" type=\"audio/wav\">\n\
            </audio>\n\n\
            1. Introduction\n\
            2. Main topic\n\
            3. Questions",
        hours_ago: 8,
    },
    DemoPost {
        title: "Cake, tabulated",
        content: "# Chocolate cake\n\n\
            | Ingredient | Amount |\n\
            |------------|--------|\n\
            | Flour | 2 cups |\n\
            | Sugar | 1.5 cups |\n\
            | Cocoa | 3/4 cup |\n\
            | Eggs | 2 |\n\n\
            Bake for 30 minutes at 175°C.",
        hours_ago: 10,
    },
    DemoPost {
        title: "Status codes cheat sheet",
        content: "# Status codes\n\n\
            | Code | Meaning |\n\
            |------|---------|\n\
            | 400 | Bad request |\n\
            | 401 | Unauthorized |\n\
            | 404 | Not found |\n\n\
            > Check the status before reading the body.",
        hours_ago: 24,
    },
];

/// Demo posts dated relative to `now`, newest first.
///
/// # Errors
/// Returns an internal error if a seed identifier fails validation.
pub fn demo_posts(now: DateTime<Utc>) -> Result<Vec<Post>, Error> {
    let author = UserId::new(DEMO_AUTHOR)
        .map_err(|err| Error::internal(format!("invalid demo author: {err}")))?;
    DEMO_POSTS
        .iter()
        .enumerate()
        .map(|(index, demo)| {
            let id = PostId::new(format!("demo-{}", index + 1))
                .map_err(|err| Error::internal(format!("invalid demo post id: {err}")))?;
            Ok(Post::new(
                id,
                demo.title,
                demo.content,
                author.clone(),
                now - Duration::hours(demo.hours_ago),
            ))
        })
        .collect()
}
