use plotters::prelude::*;
use pitchzones::{Pitch, Zone};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let home = vec![
        [5.0, 34.0], [20.0, 10.0], [18.0, 27.0], [18.0, 41.0], [20.0, 58.0],
        [40.0, 15.0], [38.0, 34.0], [40.0, 53.0], [60.0, 12.0], [62.0, 34.0], [60.0, 56.0],
    ];
    let away = vec![
        [100.0, 34.0], [85.0, 12.0], [87.0, 28.0], [87.0, 40.0], [85.0, 56.0],
        [70.0, 20.0], [68.0, 34.0], [70.0, 48.0], [50.0, 20.0], [48.0, 40.0], [52.0, 60.0],
    ];

    let pitch = Pitch::default();
    let zones = pitch.zones_for_match(home, away)?;
    draw("pitch_zones.svg", &pitch, &zones)?;
    Ok(())
}

fn parse_color(hex: &str) -> RGBColor {
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2).unwrap_or("00"), 16).unwrap_or(0);
    RGBColor(channel(1), channel(3), channel(5))
}

fn draw(filename: &str, pitch: &Pitch, zones: &[Zone<&str>]) -> Result<(), Box<dyn std::error::Error>> {
    let scale = 10.0;
    let size = ((pitch.length() * scale) as u32, (pitch.width() * scale) as u32);
    let root = SVGBackend::new(filename, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .build_cartesian_2d(0.0..pitch.length(), 0.0..pitch.width())?;

    for zone in zones {
        // An empty region draws nothing.
        if zone.region.is_empty() {
            continue;
        }
        let color = parse_color(zone.style);
        let mut poly: Vec<(f64, f64)> = zone.region.vertices().iter().map(|p| (p[0], p[1])).collect();

        chart.draw_series(std::iter::once(Polygon::new(poly.clone(), color.mix(0.4).filled())))?;

        poly.push(poly[0]);
        chart.draw_series(std::iter::once(PathElement::new(poly, BLACK.stroke_width(1))))?;
    }

    // Pitch outline and halfway line
    let (l, w) = (pitch.length(), pitch.width());
    chart.draw_series(std::iter::once(PathElement::new(
        vec![(0.0, 0.0), (l, 0.0), (l, w), (0.0, w), (0.0, 0.0)],
        BLACK.stroke_width(2),
    )))?;
    chart.draw_series(std::iter::once(PathElement::new(vec![(l / 2.0, 0.0), (l / 2.0, w)], BLACK)))?;

    chart.draw_series(zones.iter().map(|z| {
        Circle::new((z.position[0], z.position[1]), 6, parse_color(z.style).filled())
    }))?;

    root.present()?;
    println!("Output saved to {}", filename);
    Ok(())
}
