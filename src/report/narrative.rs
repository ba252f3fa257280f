//! Template-based narrative for a culvert assessment

use crate::types::{AssessmentRecord, SizingResult};

/// Human-readable Markdown report for a stored assessment.
///
/// Sections: Summary, Site, Stream Measurements, Sizing Calculation,
/// Transport Assessment, Climate Projection, Professional Design Review.
pub fn render_markdown(record: &AssessmentRecord) -> String {
    let r = &record.result;
    let site = &record.site;
    let mut sections = Vec::new();

    sections.push(format!(
        "# Culvert Assessment {}\n\n\
         Generated from field data recorded {}.",
        record.id,
        record.created_at.format("%Y-%m-%d %H:%M UTC"),
    ));

    // 1. Summary
    sections.push(format!(
        "## Summary\n\n\
         Recommended culvert diameter: **{} mm**. {}",
        r.recommended_size_mm,
        if r.requires_professional_design {
            "Professional engineering design is **required** for this crossing."
        } else {
            "Standard catalog sizing applies."
        }
    ));

    // 2. Site
    let mut site_lines = vec!["## Site\n".to_string(), format!("- **Site**: {}", site.site_name)];
    if let Some(road) = &site.road_name {
        site_lines.push(format!("- **Road**: {road}"));
    }
    if let Some(loc) = &site.location_description {
        site_lines.push(format!("- **Location**: {loc}"));
    }
    if let Some(gps) = &site.gps {
        let accuracy = gps
            .accuracy_m
            .map(|a| format!(" (±{a:.0} m)"))
            .unwrap_or_default();
        site_lines.push(format!(
            "- **GPS**: {:.6}, {:.6}{accuracy}",
            gps.latitude, gps.longitude
        ));
    }
    if let Some(assessor) = &site.assessor {
        site_lines.push(format!("- **Assessor**: {assessor}"));
    }
    if !site.photos.is_empty() {
        site_lines.push(format!("- **Photos**: {} attached", site.photos.len()));
    }
    if let Some(notes) = &site.notes {
        site_lines.push(format!("- **Notes**: {notes}"));
    }
    sections.push(site_lines.join("\n"));

    // 3. Stream Measurements
    let m = &record.inputs.measurement;
    sections.push(format!(
        "## Stream Measurements\n\n\
         - Top widths (m): {}\n\
         - Bottom width (m): {:.2}\n\
         - Depths (m): {}\n\
         - Average top width: {:.2} m, average depth: {:.2} m",
        join_readings(&m.top_widths_m),
        m.bottom_width_m,
        join_readings(&m.depths_m),
        r.average_top_width_m,
        r.average_depth_m,
    ));

    // 4. Sizing Calculation
    let table_str = match r.table_based_size_mm {
        Some(mm) => format!("{mm} mm"),
        None => "beyond table (professional design)".to_string(),
    };
    sections.push(format!(
        "## Sizing Calculation\n\n\
         | Quantity | Value |\n\
         |---|---|\n\
         | Cross-sectional area | {:.3} m² |\n\
         | End-opening area | {:.3} m² |\n\
         | Area-based diameter | {} mm (calculated {} mm) |\n\
         | California Method | {} |\n\
         | Base size | {} mm |",
        r.cross_sectional_area_m2,
        r.end_opening_area_m2,
        r.area_based_size_mm,
        r.area_based_diameter_raw_mm,
        table_str,
        r.base_size_mm,
    ));

    // 5. Transport Assessment
    let mut transport_lines = vec!["## Transport Assessment\n".to_string()];
    match &record.inputs.transport {
        None => transport_lines.push("Transport risk was not assessed.".to_string()),
        Some(t) => {
            transport_lines.push(format!(
                "Debris rating **{}**, sediment wedge {:.0} cm, largest log {:.2} m. \
                 Transport index: **{:.2}**.",
                t.debris_rating, t.sediment_depth_cm, t.max_log_diameter_m, r.transport_index
            ));
            if let Some(rec) = &r.transport_recommendation {
                transport_lines.push(format!(
                    "\n{rec} ({} mm -> {} mm).",
                    r.base_size_mm, r.transport_adjusted_size_mm
                ));
            }
            if r.transport_bump_capped {
                transport_lines.push(
                    "\nNo larger standard size exists; the crossing needs a site-specific design."
                        .to_string(),
                );
            }
            for tip in &r.transport_tips {
                transport_lines.push(format!("- {tip}"));
            }
        }
    }
    sections.push(transport_lines.join("\n"));

    // 6. Climate Projection
    let climate = match (r.has_climate_uplift(), r.climate_adjusted_area_m2) {
        (true, Some(area)) => format!(
            "Climate factor {:.2} applied: end-opening area {:.3} m² -> {:.3} m², \
             climate-adjusted size {} mm.",
            r.climate_factor, r.end_opening_area_m2, area, r.climate_adjusted_size_mm
        ),
        _ => "No climate projection uplift applied.".to_string(),
    };
    sections.push(format!("## Climate Projection\n\n{climate}"));

    // 7. Professional Design Review
    sections.push(format!(
        "## Professional Design Review\n\n{}",
        professional_review_text(r)
    ));

    sections.join("\n\n") + "\n"
}

/// Compact plain-text summary of a sizing result.
pub fn render_text(result: &SizingResult) -> String {
    let table = result
        .table_based_size_mm
        .map_or_else(|| "Q100 (professional design)".to_string(), |mm| format!("{mm} mm"));
    let mut lines = vec![
        format!("Average top width:     {:.2} m", result.average_top_width_m),
        format!("Average depth:         {:.2} m", result.average_depth_m),
        format!("Cross-sectional area:  {:.3} m2", result.cross_sectional_area_m2),
        format!("End-opening area:      {:.3} m2", result.end_opening_area_m2),
        format!(
            "Area-based size:       {} mm (calculated {} mm)",
            result.area_based_size_mm, result.area_based_diameter_raw_mm
        ),
        format!("California Method:     {table}"),
        format!("Base size:             {} mm", result.base_size_mm),
        format!(
            "Transport index:       {:.2} -> {} mm",
            result.transport_index, result.transport_adjusted_size_mm
        ),
        format!(
            "Climate factor:        {:.2} -> {} mm",
            result.climate_factor, result.climate_adjusted_size_mm
        ),
        format!("RECOMMENDED SIZE:      {} mm", result.recommended_size_mm),
    ];
    if let Some(rec) = &result.transport_recommendation {
        lines.push(format!("Note: {rec}"));
    }
    if result.requires_professional_design {
        lines.push("PROFESSIONAL ENGINEERING DESIGN REQUIRED".to_string());
    }
    lines.join("\n")
}

fn professional_review_text(r: &SizingResult) -> String {
    if !r.requires_professional_design {
        return "Not required. The recommended size is within the standard catalog.".to_string();
    }
    let mut reasons = Vec::new();
    if r.table_based_size_mm.is_none() {
        reasons.push("stream geometry is beyond the California Method table");
    }
    if r.transport_bump_capped {
        reasons.push("transport risk calls for a pipe larger than the catalog provides");
    }
    if reasons.is_empty() {
        reasons.push("the recommended size reaches the professional design threshold");
    }
    format!("**Required**: {}.", reasons.join("; "))
}

fn join_readings(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{v:.2}"))
        .collect::<Vec<_>>()
        .join(", ")
}
