//! AutoLISP star map export.
//!
//! Produces a self-contained LISP program that draws a polar projection of
//! the visible sky (zenith at the centre, horizon at the rim) in any
//! AutoLISP-compatible CAD host.

use chrono::{DateTime, Utc};

use crate::core::domain::VisibleObject;

/// Stars brighter than this are labelled and listed first.
pub const BRIGHT_LIMIT: f64 = 2.0;

/// Upper bound of the medium group.
pub const MEDIUM_LIMIT: f64 = 3.5;

const HELPERS: &str = r#"; --- Configuration ---
(setq PI 3.14159265359)
(setq DEG2RAD (/ PI 180.0))
(setq RADIUS 100.0)  ; Sky dome radius in drawing units

; --- Helper Functions ---

(defun deg-to-rad (deg)
  "Convert degrees to radians"
  (* deg DEG2RAD))

(defun polar-to-xy (az alt / r x y)
  "Project azimuth/altitude onto the drawing plane.
   Zenith at the origin, horizon on the RADIUS circle."
  (setq r (* RADIUS (- 1.0 (/ alt 90.0))))
  (setq x (* r (sin (deg-to-rad az))))
  (setq y (* r (cos (deg-to-rad az))))
  (list x y))

(defun mag-to-size (mag)
  "Circle radius for a magnitude; brighter is larger."
  (max 0.5 (- 6.0 (* mag 1.0))))

; --- Drawing Functions ---

(defun draw-star (name az alt mag / pos size)
  "Draw one star, labelling the bright ones"
  (setq pos (polar-to-xy az alt))
  (setq size (mag-to-size mag))
  (command "CIRCLE" pos size)
  (if (< mag 2.0)
    (command "TEXT"
      (list (+ (car pos) (+ size 1))
            (+ (cadr pos) 0.5))
      1.5 0 name)))

(defun draw-grid ()
  "Horizon, altitude rings and cardinal points"
  (command "CIRCLE" (list 0 0) RADIUS)
  (command "CIRCLE" (list 0 0) (* RADIUS 0.667))  ; 30 deg
  (command "CIRCLE" (list 0 0) (* RADIUS 0.333))  ; 60 deg
  (command "TEXT" (list -2 (+ RADIUS 3)) 3 0 "N")
  (command "TEXT" (list -2 (- (- RADIUS) 6)) 3 0 "S")
  (command "TEXT" (list (+ RADIUS 2) -1) 3 0 "E")
  (command "TEXT" (list (- (- RADIUS) 8) -1) 3 0 "W"))
"#;

/// Observation metadata printed in the program header.
#[derive(Debug, Clone)]
pub struct StarMapHeader<'a> {
    pub location: &'a str,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub instant: DateTime<Utc>,
}

/// Brightness group of a star in the generated program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrightnessGroup {
    Bright,
    Medium,
    Dim,
}

impl BrightnessGroup {
    pub fn of(magnitude: f64) -> Self {
        if magnitude < BRIGHT_LIMIT {
            BrightnessGroup::Bright
        } else if magnitude < MEDIUM_LIMIT {
            BrightnessGroup::Medium
        } else {
            BrightnessGroup::Dim
        }
    }

    fn heading(&self) -> &'static str {
        match self {
            BrightnessGroup::Bright => "Bright Stars (mag < 2.0)",
            BrightnessGroup::Medium => "Medium Stars (2.0 <= mag < 3.5)",
            BrightnessGroup::Dim => "Dim Stars (mag >= 3.5)",
        }
    }
}

/// Renders the AutoLISP program for a set of visible stars.
///
/// Stars are sorted brightest first and emitted in three groups, one
/// `(draw-star "Name" az alt mag)` call per star.
pub fn render_star_map(header: &StarMapHeader<'_>, stars: &[VisibleObject]) -> String {
    let mut sorted: Vec<&VisibleObject> = stars.iter().collect();
    sorted.sort_by(|a, b| a.object.magnitude.total_cmp(&b.object.magnitude));

    let count = sorted.len();
    let location = escape_lisp_string(header.location);
    let mut out = String::new();

    out.push_str("; ============================================\n");
    out.push_str("; Star Sky Visualization - AutoLISP\n");
    out.push_str("; ============================================\n");
    out.push_str(&format!(
        "; Location: {} ({:.2}°N, {:.2}°E)\n",
        header.location, header.latitude_deg, header.longitude_deg
    ));
    out.push_str(&format!(
        "; Time: {}\n",
        header.instant.format("%Y-%m-%d %H:%M UTC")
    ));
    out.push_str(&format!("; Stars: {} visible above horizon\n", count));
    out.push_str(";\n; Generated from catalog positions. Run it to draw a polar star map.\n\n");
    out.push_str(HELPERS);

    out.push_str("\n(defun draw-title ()\n  \"Title block\"\n");
    out.push_str(
        "  (command \"TEXT\" (list -95 (+ RADIUS 15)) 4 0\n    \"ASTRAL SKY - Polar Star Map\")\n",
    );
    out.push_str(&format!(
        "  (command \"TEXT\" (list -95 (+ RADIUS 10)) 2.5 0\n    \"{}\"))\n",
        location
    ));

    out.push_str("\n; =============================================\n");
    out.push_str("; MAIN PROGRAM\n");
    out.push_str("; =============================================\n\n");
    out.push_str("(princ \"\\n=== Astral Sky Drawing ===\")\n");
    out.push_str("(princ \"\\nDrawing sky grid...\")\n");
    out.push_str("(draw-grid)\n(draw-title)\n");
    out.push_str(&format!("(princ \"\\nDrawing {} stars...\")\n", count));
    out.push_str("\n; --- Star Data ---\n");
    out.push_str("; Each star: (draw-star \"Name\" Azimuth Altitude Magnitude)\n");

    for group in [
        BrightnessGroup::Bright,
        BrightnessGroup::Medium,
        BrightnessGroup::Dim,
    ] {
        let members: Vec<&&VisibleObject> = sorted
            .iter()
            .filter(|v| BrightnessGroup::of(v.object.magnitude) == group)
            .collect();

        out.push_str(&format!(
            "\n; --- {} - {} stars ---\n",
            group.heading(),
            members.len()
        ));
        for visible in members {
            out.push_str(&format!(
                "(draw-star \"{}\" {:.1} {:.1} {:.2})\n",
                escape_lisp_string(&visible.object.name),
                visible.position.azimuth_deg,
                visible.position.altitude_deg,
                visible.object.magnitude
            ));
        }
    }

    out.push_str("\n; --- Complete ---\n");
    out.push_str("(princ \"\\n=== Drawing Complete ===\")\n");
    out.push_str(&format!("(princ \"\\n{} stars rendered\")\n", count));
    out.push_str(&format!("(princ \"\\nLocation: {}\")\n", location));
    out.push_str("(princ)\n");

    out
}

fn escape_lisp_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::{CelestialObject, HorizonPosition};
    use chrono::TimeZone;

    fn visible(name: &str, magnitude: f64, alt: f64, az: f64) -> VisibleObject {
        VisibleObject {
            object: CelestialObject::new(name, 0.0, 0.0, magnitude, "A0V"),
            position: HorizonPosition {
                altitude_deg: alt,
                azimuth_deg: az,
            },
        }
    }

    fn header() -> StarMapHeader<'static> {
        StarMapHeader {
            location: "Lüdinghausen",
            latitude_deg: 51.77,
            longitude_deg: 7.44,
            instant: Utc.with_ymd_and_hms(2025, 1, 15, 21, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_groups_and_ordering() {
        let stars = vec![
            visible("Dimmer", 3.9, 10.0, 20.0),
            visible("Mid", 2.5, 30.0, 40.0),
            visible("Vega", 0.03, 45.3, 300.04),
        ];
        let lisp = render_star_map(&header(), &stars);

        assert!(lisp.contains("; Location: Lüdinghausen (51.77°N, 7.44°E)"));
        assert!(lisp.contains("; Time: 2025-01-15 21:00 UTC"));
        assert!(lisp.contains("Bright Stars (mag < 2.0) - 1 stars"));
        assert!(lisp.contains("(draw-star \"Vega\" 300.0 45.3 0.03)"));

        let vega = lisp.find("\"Vega\"").unwrap();
        let mid = lisp.find("\"Mid\"").unwrap();
        let dim = lisp.find("\"Dimmer\"").unwrap();
        assert!(vega < mid && mid < dim);
        assert!(lisp.ends_with("(princ)\n"));
    }

    #[test]
    fn test_group_boundaries() {
        assert_eq!(BrightnessGroup::of(1.99), BrightnessGroup::Bright);
        assert_eq!(BrightnessGroup::of(2.0), BrightnessGroup::Medium);
        assert_eq!(BrightnessGroup::of(3.5), BrightnessGroup::Dim);
    }

    #[test]
    fn test_quotes_are_escaped() {
        let stars = vec![visible("The \"Star\"", 1.0, 10.0, 10.0)];
        let lisp = render_star_map(&header(), &stars);
        assert!(lisp.contains("(draw-star \"The \\\"Star\\\"\""));
    }
}
