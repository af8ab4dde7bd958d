/// Default file locations used when neither config nor CLI name one
pub const DEFAULT_CONFIG_FILE: &str = "roster_import.toml";
pub const DEFAULT_INPUT: &str = "input.tsv";
pub const DEFAULT_FLAT_OUTPUT: &str = "output_file_for_dl.json";
pub const DEFAULT_GROUPED_OUTPUT: &str = "output_file.json";
pub const DEFAULT_IMG_DIR: &str = "img";

/// Height written into every flat record; the flat layout has no height column.
pub const DEFAULT_HEIGHT_CM: f64 = 160.0;

/// Overrides `download.img_dir` from the environment (or `.env`)
pub const IMG_DIR_ENV: &str = "ROSTER_IMG_DIR";

/// Direct-download endpoint for shared Drive files
pub const DRIVE_DOWNLOAD_BASE: &str = "https://drive.google.com/uc?export=download&id=";

/// Extensions accepted as an already-downloaded image, in lookup order
pub const IMAGE_EXTENSIONS: [&str; 2] = ["jpg", "png"];
