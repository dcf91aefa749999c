// loader.rs

use crate::clip::{Clip, FrameSource};
use crate::error::{DecodeError, Error, LoadError, Result};
use crate::frame::{Frame, Rgb};
use ::config::{Config, File};
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// One line of a clip manifest: a file stem plus an optional rotation in
/// degrees, counter-clockwise.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    #[serde(default)]
    pub rotation: Option<i64>,
}

impl ManifestEntry {
    pub fn path(&self, indir: &Path, ext: &str) -> PathBuf {
        indir.join(format!("{}{}", self.name, ext))
    }

    pub fn quarter_turns(&self) -> std::result::Result<u8, LoadError> {
        let degrees = self.rotation.unwrap_or(0);
        let normalized = degrees.rem_euclid(360);
        if normalized % 90 != 0 {
            return Err(LoadError::UnsupportedRotation {
                name: self.name.clone(),
                degrees,
            });
        }
        Ok((normalized / 90) as u8)
    }
}

/// Ordered clip list with per-clip options.
///
/// YAML manifests may be a bare list or wrapped in a `clips` key:
///
/// ```yaml
/// - name: CatsA
/// - name: CatsB
///   rotation: 90
/// ```
///
/// Other formats the `config` crate detects by extension (TOML, JSON) need
/// the `clips` key.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub clips: Vec<ManifestEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ManifestShape {
    List(Vec<ManifestEntry>),
    Wrapped { clips: Vec<ManifestEntry> },
}

impl From<ManifestShape> for Manifest {
    fn from(shape: ManifestShape) -> Self {
        match shape {
            ManifestShape::List(clips) | ManifestShape::Wrapped { clips } => Manifest { clips },
        }
    }
}

impl Manifest {
    pub fn from_file(path: &Path) -> std::result::Result<Self, LoadError> {
        let invalid = |reason: String| LoadError::Manifest {
            path: path.to_path_buf(),
            reason,
        };
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yml" | "yaml")
        );
        if is_yaml {
            let text = fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
            let shape: ManifestShape =
                serde_yaml::from_str(&text).map_err(|e| invalid(e.to_string()))?;
            return Ok(shape.into());
        }
        Config::builder()
            .add_source(File::from(path).required(true))
            .build()
            .and_then(|c| c.try_deserialize::<Manifest>())
            .map_err(|e| invalid(e.to_string()))
    }
}

/// Turns a file into a decodable source. Real codecs plug in here.
pub trait ClipLoader {
    fn load(&mut self, path: &Path) -> std::result::Result<Box<dyn FrameSource>, LoadError>;

    /// Loads a manifest entry and applies its rotation before the clip is
    /// handed to the core.
    fn load_entry(
        &mut self,
        entry: &ManifestEntry,
        indir: &Path,
        ext: &str,
    ) -> std::result::Result<Box<dyn FrameSource>, LoadError> {
        let turns = entry.quarter_turns()?;
        let source = self.load(&entry.path(indir, ext))?;
        if turns == 0 {
            Ok(source)
        } else {
            debug!("Rotating {} by {} quarter turns", entry.name, turns);
            Ok(Box::new(Rotated::new(source, turns)))
        }
    }
}

/// Loads every clip for a session: the manifest entries in order when a
/// manifest is given, otherwise each file in `indir` ending in `ext`,
/// sorted by path. An empty result is a configuration error.
pub fn load_clips<L: ClipLoader>(
    loader: &mut L,
    indir: &Path,
    manifest: Option<&Path>,
    ext: &str,
) -> Result<Vec<Clip>> {
    let mut clips = Vec::new();
    match manifest {
        Some(manifest_path) => {
            let manifest = Manifest::from_file(manifest_path)?;
            for entry in &manifest.clips {
                let source = loader.load_entry(entry, indir, ext)?;
                clips.push(Clip::new(clips.len(), entry.name.clone(), source));
            }
        }
        None => {
            for path in scan_directory(indir, ext)? {
                let source = loader.load(&path)?;
                clips.push(Clip::new(clips.len(), clip_name(&path), source));
            }
        }
    }

    if clips.is_empty() {
        return Err(Error::Config(format!(
            "no clips found in {} with extension {}",
            indir.display(),
            ext
        )));
    }
    info!("Loaded {} clips", clips.len());
    for clip in &clips {
        debug!("  {:?}", clip);
    }
    Ok(clips)
}

fn scan_directory(indir: &Path, ext: &str) -> std::result::Result<Vec<PathBuf>, LoadError> {
    let read_err = |source| LoadError::Directory {
        path: indir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in fs::read_dir(indir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or(false, |n| n.ends_with(ext));
        if matches && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn clip_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Wraps a source so every frame comes out rotated counter-clockwise.
pub struct Rotated<S> {
    inner: S,
    quarter_turns: u8,
}

impl<S: FrameSource> Rotated<S> {
    pub fn new(inner: S, quarter_turns: u8) -> Self {
        Self {
            inner,
            quarter_turns: quarter_turns % 4,
        }
    }
}

impl<S: FrameSource> FrameSource for Rotated<S> {
    fn size(&self) -> (u32, u32) {
        let (w, h) = self.inner.size();
        if self.quarter_turns % 2 == 1 {
            (h, w)
        } else {
            (w, h)
        }
    }

    fn duration(&self) -> Option<f64> {
        self.inner.duration()
    }

    fn frame_at(&mut self, t: f64) -> std::result::Result<Frame, DecodeError> {
        Ok(self.inner.frame_at(t)?.rotate_ccw(self.quarter_turns))
    }
}

/// Synthetic clip: a solid tint with a white bar sweeping left to right
/// once per duration.
#[derive(Debug, Clone)]
pub struct PatternSource {
    size: (u32, u32),
    duration: Option<f64>,
    color: Rgb,
    sweep: bool,
}

impl PatternSource {
    pub fn new(size: (u32, u32), duration: Option<f64>, color: Rgb) -> Self {
        Self {
            size,
            duration,
            color,
            sweep: true,
        }
    }

    /// A flat color with no moving bar.
    pub fn solid(size: (u32, u32), duration: Option<f64>, color: Rgb) -> Self {
        Self {
            sweep: false,
            ..Self::new(size, duration, color)
        }
    }

    /// Pattern tinted deterministically from `name`.
    pub fn for_name(name: &str, size: (u32, u32), duration: Option<f64>) -> Self {
        Self::new(size, duration, tint_for(name))
    }
}

impl FrameSource for PatternSource {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn frame_at(&mut self, t: f64) -> std::result::Result<Frame, DecodeError> {
        if let Some(duration) = self.duration {
            if t >= duration {
                return Err(DecodeError::EndOfStream { t });
            }
        }
        let (w, h) = self.size;
        let mut frame = Frame::filled(w, h, self.color);
        if self.sweep && w > 0 {
            let period = self.duration.unwrap_or(1.0).max(f64::EPSILON);
            let x = (((t % period) / period) * f64::from(w)) as u32;
            for y in 0..h {
                frame.set_pixel(x.min(w - 1), y, [255, 255, 255]);
            }
        }
        Ok(frame)
    }
}

/// FNV-1a over the name, folded into a color bright enough to see.
fn tint_for(name: &str) -> Rgb {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in name.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    let channel = |shift: u32| 64 + ((hash >> shift) & 0xFF) as u8 / 2;
    [channel(0), channel(8), channel(16)]
}

/// The loader the binary uses: every existing file becomes a
/// [`PatternSource`] tinted from its name.
#[derive(Debug, Clone)]
pub struct PatternLoader {
    pub size: (u32, u32),
    pub duration: Option<f64>,
}

impl Default for PatternLoader {
    fn default() -> Self {
        Self {
            size: (320, 240),
            duration: Some(4.0),
        }
    }
}

impl ClipLoader for PatternLoader {
    fn load(&mut self, path: &Path) -> std::result::Result<Box<dyn FrameSource>, LoadError> {
        if !path.is_file() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }
        Ok(Box::new(PatternSource::for_name(
            &clip_name(path),
            self.size,
            self.duration,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn touch(dir: &Path, name: &str) {
        fs::File::create(dir.join(name)).unwrap();
    }

    #[test]
    fn test_directory_scan_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.mp4");
        touch(dir.path(), "a.mp4");
        touch(dir.path(), "notes.txt");

        let clips = load_clips(&mut PatternLoader::default(), dir.path(), None, ".mp4").unwrap();
        let names: Vec<_> = clips.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(clips[1].id, 1);
    }

    #[test]
    fn test_empty_directory_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_clips(&mut PatternLoader::default(), dir.path(), None, ".mp4");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_manifest_order_and_rotation() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "CatsA.mp4");
        touch(dir.path(), "CatsB.mp4");
        let manifest_path = dir.path().join("map.yml");
        let mut manifest = fs::File::create(&manifest_path).unwrap();
        writeln!(
            manifest,
            "clips:\n  - name: CatsB\n    rotation: 90\n  - name: CatsA"
        )
        .unwrap();

        let mut loader = PatternLoader {
            size: (40, 20),
            duration: Some(1.0),
        };
        let clips = load_clips(&mut loader, dir.path(), Some(&manifest_path), ".mp4").unwrap();
        assert_eq!(clips[0].name, "CatsB");
        assert_eq!(clips[0].size(), (20, 40));
        assert_eq!(clips[1].size(), (40, 20));
    }

    #[test]
    fn test_bare_list_manifest() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "CatsA.mp4");
        touch(dir.path(), "CatsB.mp4");
        let manifest_path = dir.path().join("map.yml");
        fs::write(
            &manifest_path,
            "- name: CatsB\n  rotation: 90\n- name: CatsA\n",
        )
        .unwrap();

        let mut loader = PatternLoader {
            size: (40, 20),
            duration: Some(1.0),
        };
        let clips = load_clips(&mut loader, dir.path(), Some(&manifest_path), ".mp4").unwrap();
        let names: Vec<_> = clips.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["CatsB", "CatsA"]);
        assert_eq!(clips[0].size(), (20, 40));
    }

    #[test]
    fn test_toml_manifest_needs_clips_key() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "CatsA.mp4");
        let manifest_path = dir.path().join("map.toml");
        fs::write(&manifest_path, "[[clips]]\nname = \"CatsA\"\nrotation = 180\n").unwrap();

        let manifest = Manifest::from_file(&manifest_path).unwrap();
        assert_eq!(manifest.clips[0].quarter_turns().unwrap(), 2);
    }

    #[test]
    fn test_manifest_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("map.yml");
        fs::write(&manifest_path, "clips:\n  - name: Missing\n").unwrap();
        let result = load_clips(
            &mut PatternLoader::default(),
            dir.path(),
            Some(&manifest_path),
            ".mp4",
        );
        assert!(matches!(result, Err(Error::Load(LoadError::NotFound(_)))));
    }

    #[test]
    fn test_rotation_must_be_quarter_turns() {
        let entry = ManifestEntry {
            name: "x".to_string(),
            rotation: Some(45),
        };
        assert!(entry.quarter_turns().is_err());
        let entry = ManifestEntry {
            name: "x".to_string(),
            rotation: Some(-90),
        };
        assert_eq!(entry.quarter_turns().unwrap(), 3);
    }

    #[test]
    fn test_pattern_end_of_stream() {
        let mut source = PatternSource::new((4, 4), Some(1.0), [10, 20, 30]);
        assert!(source.frame_at(0.5).is_ok());
        assert_eq!(
            source.frame_at(1.0),
            Err(DecodeError::EndOfStream { t: 1.0 })
        );
    }

    #[test]
    fn test_tint_is_deterministic() {
        assert_eq!(tint_for("CatsA"), tint_for("CatsA"));
    }
}
