//! Shipped task catalog.
//!
//! Static registration table built at process initialization. Each task asks
//! the model for one parametric part, written to a declared `.scad` artifact
//! and rendered from two camera views.

use crate::render::CameraView;

use super::{InteractionMode, OutputSpec, TaskDescriptor};

/// The two views every shipped task renders: the renderer's default framing
/// plus an underside isometric that exposes pockets, counterbores, and other
/// bottom-face features the default view hides.
fn standard_views() -> Vec<CameraView> {
    vec![
        CameraView::named("default"),
        CameraView::named("bottom-isometric")
            .with_translation([0.0, 0.0, 0.0])
            .with_rotation([225.0, 0.0, 45.0]),
    ]
}

fn scripting_rules(artifact: &str) -> String {
    format!(
        "\n\nWrite the complete OpenSCAD source to `{}` using the write_file tool. \
         Use parametric variables for every major dimension so the part can be \
         resized. Do not reply with the source inline; the file on disk is what \
         gets rendered.",
        artifact
    )
}

/// Returns the shipped task descriptors.
pub fn builtin_tasks() -> Vec<TaskDescriptor> {
    vec![mounting_bracket(), enclosure_lid()]
}

fn mounting_bracket() -> TaskDescriptor {
    let artifact = "mounting-bracket.scad";
    let prompt = format!(
        "Design an L-shaped mounting bracket in OpenSCAD.\n\n\
         Requirements:\n\
         - Base plate 60 mm x 40 mm, 4 mm thick, with four M4 clearance holes \
           (4.5 mm diameter) positioned 6 mm in from each corner.\n\
         - Vertical flange 60 mm wide, 35 mm tall, 4 mm thick, rising from one \
           long edge of the base, with two M5 clearance holes (5.5 mm diameter) \
           on the flange centerline, 15 mm apart.\n\
         - A triangular gusset on each side joining the base and the flange.\n\
         - All holes must be through-holes.{}",
        scripting_rules(artifact)
    );

    TaskDescriptor::new(
        "mounting-bracket",
        "L-shaped mounting bracket with bolt patterns and gussets",
        prompt,
        InteractionMode::SingleExchange,
        OutputSpec::new(artifact, standard_views()),
    )
}

fn enclosure_lid() -> TaskDescriptor {
    let artifact = "enclosure-lid.scad";
    let prompt = format!(
        "Design a snap-fit electronics enclosure lid in OpenSCAD.\n\n\
         Requirements:\n\
         - Outer footprint 80 mm x 50 mm, lid plate 2.5 mm thick with a 1 mm \
           radius edge chamfer or fillet.\n\
         - A perimeter lip 2 mm wide and 3 mm deep on the underside, inset so \
           the lid seats into an 80 x 50 box with 1.6 mm walls.\n\
         - Four cantilever snap hooks on the underside of the long edges, \
           6 mm wide, protruding 1.2 mm.\n\
         - A 12 mm x 6 mm rectangular cutout centered on one short edge for a \
           cable exit.\n\
         - Use modules for the lip and the snap hook so they are reusable.{}",
        scripting_rules(artifact)
    );

    TaskDescriptor::new(
        "enclosure-lid",
        "Snap-fit enclosure lid with perimeter lip and cable cutout",
        prompt,
        InteractionMode::MultiTurn,
        OutputSpec::new(artifact, standard_views()),
    )
}
