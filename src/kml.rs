//! KML document emission.

use image::Rgb;
use quick_xml::escape::escape;
use std::io::{self, Write};

use crate::colormap::kml_color;

/// Name of the icon image inside the KMZ archive.
pub const ICON_HREF: &str = "icon_circle.png";

/// Name of the colorbar image inside the KMZ archive.
pub const COLORBAR_HREF: &str = "colorbar.png";

/// One sample to draw on the map.
#[derive(Clone, Debug, PartialEq)]
pub struct PointRecord {
    pub lon: f64,
    pub lat: f64,
    pub value: f64,
    pub label: String,
}

/// Size of the placemark icons.
#[derive(Clone, Debug, PartialEq)]
pub enum IconSize {
    /// One size for every icon, set on the shared styles.
    Uniform(f64),
    /// One size per point, set on each placemark.
    PerPoint(Vec<f64>),
}

/// Writes a KML document with one style pair per color and one placemark
/// per point.
///
/// `buckets[i]` is the index into `colors` of `points[i]`.
pub fn write_kml<W: Write>(
    mut w: W,
    name: &str,
    colors: &[Rgb<u8>],
    points: &[PointRecord],
    buckets: &[usize],
    icon_size: &IconSize,
) -> io::Result<()> {
    writeln!(w, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(w, r#"<kml xmlns="http://www.opengis.net/kml/2.2">"#)?;
    writeln!(w, "  <Document>")?;
    writeln!(w, "    <name>{}</name>", escape(name))?;

    let style_scale = match icon_size {
        IconSize::Uniform(scale) => Some(*scale),
        IconSize::PerPoint(_) => None,
    };
    for (i, &color) in colors.iter().enumerate() {
        let color = kml_color(color);
        write_style(&mut w, &format!("icon-{}-normal", i), &color, style_scale, 0)?;
        write_style(&mut w, &format!("icon-{}-highlight", i), &color, style_scale, 1)?;

        writeln!(w, r#"    <StyleMap id="icon-{}">"#, i)?;
        for key in &["normal", "highlight"] {
            writeln!(w, "      <Pair>")?;
            writeln!(w, "        <key>{}</key>", key)?;
            writeln!(w, "        <styleUrl>#icon-{}-{}</styleUrl>", i, key)?;
            writeln!(w, "      </Pair>")?;
        }
        writeln!(w, "    </StyleMap>")?;
        writeln!(w)?;
    }

    for (j, (point, bucket)) in points.iter().zip(buckets).enumerate() {
        writeln!(w, "    <Placemark>")?;
        writeln!(w, "      <name>{}</name>", escape(point.label.as_str()))?;
        writeln!(w, "      <styleUrl>#icon-{}</styleUrl>", bucket)?;
        if let IconSize::PerPoint(sizes) = icon_size {
            if let Some(size) = sizes.get(j) {
                writeln!(w, "      <Style>")?;
                writeln!(w, "        <IconStyle>")?;
                writeln!(w, "          <scale>{}</scale>", size)?;
                writeln!(w, "        </IconStyle>")?;
                writeln!(w, "      </Style>")?;
            }
        }
        writeln!(w, "      <Point>")?;
        writeln!(w, "        <coordinates>")?;
        writeln!(w, "          {},{},0", point.lon, point.lat)?;
        writeln!(w, "        </coordinates>")?;
        writeln!(w, "      </Point>")?;
        writeln!(w, "    </Placemark>")?;
        writeln!(w)?;
    }

    writeln!(w, "    <ScreenOverlay>")?;
    writeln!(w, "      <name>Legend</name>")?;
    writeln!(w, "      <Icon>")?;
    writeln!(w, "        <href>{}</href>", COLORBAR_HREF)?;
    writeln!(w, "      </Icon>")?;
    writeln!(
        w,
        r#"      <overlayXY x="0" y="0" xunits="fraction" yunits="fraction"/>"#
    )?;
    writeln!(
        w,
        r#"      <screenXY x="25" y="95" xunits="pixels" yunits="pixels"/>"#
    )?;
    writeln!(
        w,
        r#"      <size x="0" y="0" xunits="pixels" yunits="pixels"/>"#
    )?;
    writeln!(w, "    </ScreenOverlay>")?;
    writeln!(w, "  </Document>")?;
    writeln!(w, "</kml>")?;

    Ok(())
}

fn write_style<W: Write>(
    w: &mut W,
    id: &str,
    color: &str,
    scale: Option<f64>,
    label_scale: u8,
) -> io::Result<()> {
    writeln!(w, r#"    <Style id="{}">"#, id)?;
    writeln!(w, "      <IconStyle>")?;
    writeln!(w, "        <color>{}</color>", color)?;
    if let Some(scale) = scale {
        writeln!(w, "        <scale>{}</scale>", scale)?;
    }
    writeln!(w, "        <Icon>")?;
    writeln!(w, "          <href>{}</href>", ICON_HREF)?;
    writeln!(w, "        </Icon>")?;
    writeln!(w, "      </IconStyle>")?;
    writeln!(w, "      <LabelStyle>")?;
    writeln!(w, "        <scale>{}</scale>", label_scale)?;
    writeln!(w, "      </LabelStyle>")?;
    writeln!(w, "      <BalloonStyle>")?;
    writeln!(w, "        <text><![CDATA[<h3>$[name]</h3>]]></text>")?;
    writeln!(w, "      </BalloonStyle>")?;
    writeln!(w, "    </Style>")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points() -> Vec<PointRecord> {
        vec![
            PointRecord {
                lon: 142.37,
                lat: 38.3,
                value: 29.0,
                label: "Tohoku, Japan".to_owned(),
            },
            PointRecord {
                lon: -73.1,
                lat: -36.1,
                value: 22.9,
                label: "Maule & Biobio <Chile>".to_owned(),
            },
        ]
    }

    fn render(colors: &[Rgb<u8>], buckets: &[usize], size: &IconSize) -> String {
        let mut buf = Vec::new();
        write_kml(&mut buf, "quakes", colors, &points(), buckets, size).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn one_style_pair_per_color() {
        let colors = vec![Rgb([0, 0, 255]); 4];
        let kml = render(&colors, &[0, 3], &IconSize::Uniform(0.5));

        assert_eq!(kml.matches("<StyleMap ").count(), 4);
        assert_eq!(kml.matches("<Style id=").count(), 8);
        assert!(kml.contains(r#"<Style id="icon-3-normal">"#));
        assert!(kml.contains(r#"<Style id="icon-3-highlight">"#));
        assert!(kml.contains("<color>ffff0000</color>"));
        assert_eq!(kml.matches("<scale>0.5</scale>").count(), 8);
    }

    #[test]
    fn placemarks_reference_buckets() {
        let colors = vec![Rgb([0, 0, 0]); 4];
        let kml = render(&colors, &[0, 3], &IconSize::Uniform(1.0));

        assert_eq!(kml.matches("<Placemark>").count(), 2);
        assert!(kml.contains("<styleUrl>#icon-0</styleUrl>"));
        assert!(kml.contains("<styleUrl>#icon-3</styleUrl>"));
        assert!(kml.contains("142.37,38.3,0"));
        assert!(kml.contains("-73.1,-36.1,0"));
    }

    #[test]
    fn labels_are_escaped() {
        let kml = render(&[Rgb([0, 0, 0])], &[0, 0], &IconSize::Uniform(1.0));
        assert!(kml.contains("<name>Maule &amp; Biobio &lt;Chile&gt;</name>"));
    }

    #[test]
    fn per_point_sizes_are_inlined() {
        let colors = vec![Rgb([0, 0, 0]); 2];
        let kml = render(&colors, &[0, 1], &IconSize::PerPoint(vec![2.5, 0.75]));

        // shared styles carry no scale of their own
        assert!(!kml.contains("<IconStyle>\n        <color>ff000000</color>\n        <scale>"));
        assert!(kml.contains("<scale>2.5</scale>"));
        assert!(kml.contains("<scale>0.75</scale>"));
        assert_eq!(kml.matches("      <Style>").count(), 2);
    }

    #[test]
    fn legend_overlay() {
        let kml = render(&[], &[], &IconSize::Uniform(1.0));
        assert!(kml.contains("<href>colorbar.png</href>"));
        assert!(kml.contains("<name>Legend</name>"));
        assert!(kml.trim_end().ends_with("</kml>"));
    }
}
