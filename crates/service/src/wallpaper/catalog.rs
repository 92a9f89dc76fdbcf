//! Built-in sample wallpapers used for first-run seeding and the read fallback.

use chrono::{DateTime, FixedOffset, NaiveDate};

use super::domain::NewWallpaper;

struct Sample {
    title: &'static str,
    description: &'static str,
    category: &'static str,
    tags: [&'static str; 3],
    resolution: &'static str,
    image_url: &'static str,
    downloads: i64,
    uploaded: (i32, u32, u32),
}

const SAMPLES: [Sample; 5] = [
    Sample {
        title: "Mountain Landscape",
        description: "Beautiful mountain landscape at sunset",
        category: "Nature",
        tags: ["mountains", "sunset", "landscape"],
        resolution: "1920x1080",
        image_url: "https://res.cloudinary.com/demo/image/upload/v1312461204/sample.jpg",
        downloads: 42,
        uploaded: (2023, 1, 15),
    },
    Sample {
        title: "Cosmic Galaxy",
        description: "Deep space galaxy with colorful nebula",
        category: "Space",
        tags: ["galaxy", "space", "stars"],
        resolution: "3840x2160",
        image_url: "https://res.cloudinary.com/demo/image/upload/v1616526331/samples/landscapes/nature-mountains.jpg",
        downloads: 128,
        uploaded: (2023, 2, 20),
    },
    Sample {
        title: "Urban Cityscape",
        description: "Modern city skyline at night",
        category: "Urban",
        tags: ["city", "skyline", "night"],
        resolution: "2560x1440",
        image_url: "https://res.cloudinary.com/demo/image/upload/v1616526331/samples/landscapes/architecture-signs.jpg",
        downloads: 86,
        uploaded: (2023, 3, 10),
    },
    Sample {
        title: "Ocean Waves",
        description: "Serene ocean waves on a tropical beach",
        category: "Nature",
        tags: ["ocean", "beach", "waves"],
        resolution: "1920x1080",
        image_url: "https://res.cloudinary.com/demo/image/upload/v1616526331/samples/landscapes/beach-boat.jpg",
        downloads: 67,
        uploaded: (2023, 4, 5),
    },
    Sample {
        title: "Abstract Art",
        description: "Colorful abstract digital artwork",
        category: "Abstract",
        tags: ["abstract", "art", "colorful"],
        resolution: "2560x1440",
        image_url: "https://res.cloudinary.com/demo/image/upload/v1616526331/samples/animals/three-dogs.jpg",
        downloads: 54,
        uploaded: (2023, 5, 12),
    },
];

fn midnight_utc((y, m, d): (i32, u32, u32)) -> Option<DateTime<FixedOffset>> {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

/// The sample catalog, oldest first.
pub fn sample_catalog() -> Vec<NewWallpaper> {
    SAMPLES
        .iter()
        .map(|s| NewWallpaper {
            title: s.title.to_string(),
            description: Some(s.description.to_string()),
            category: s.category.to_string(),
            tags: s.tags.iter().map(|t| t.to_string()).collect(),
            resolution: s.resolution.to_string(),
            image_url: s.image_url.to_string(),
            downloads: s.downloads,
            uploaded_at: midnight_utc(s.uploaded),
            user_id: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_five_dated_entries() {
        let c = sample_catalog();
        assert_eq!(c.len(), 5);
        assert!(c.iter().all(|w| w.uploaded_at.is_some() && !w.tags.is_empty()));
        assert_eq!(c.iter().filter(|w| w.category == "Nature").count(), 2);
        assert_eq!(c[0].uploaded_at.unwrap().to_rfc3339(), "2023-01-15T00:00:00+00:00");
    }
}
