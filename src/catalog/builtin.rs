use super::control::{ArmOperation, IfElseOperation, PlaceholderOperation, condition_field};
use super::field::FieldSpec;
use super::operation::{Category, Operation};
use super::template::TemplateOperation;
use crate::error::CatalogError;

const MICROBIT: &str = "from microbit import *";
const MUSIC: &str = "import music";
const RADIO: &str = "import radio";

pub const IMAGES: &[&str] = &[
    "HEART",
    "HEART_SMALL",
    "HAPPY",
    "SMILE",
    "SAD",
    "CONFUSED",
    "ANGRY",
    "ASLEEP",
    "SURPRISED",
    "SILLY",
    "FABULOUS",
    "MEH",
    "YES",
    "NO",
    "TRIANGLE",
    "DIAMOND",
    "SQUARE",
    "SQUARE_SMALL",
    "RABBIT",
    "COW",
    "MUSIC_QUAVER",
    "PITCHFORK",
    "TARGET",
    "TSHIRT",
    "ROLLERSKATE",
    "DUCK",
    "HOUSE",
    "TORTOISE",
    "BUTTERFLY",
    "STICKFIGURE",
    "GHOST",
    "SWORD",
    "GIRAFFE",
    "SKULL",
    "UMBRELLA",
    "SNAKE",
];

pub const MELODIES: &[&str] = &[
    "DADADADUM",
    "ENTERTAINER",
    "PRELUDE",
    "ODE",
    "NYAN",
    "RINGTONE",
    "FUNK",
    "BLUES",
    "BIRTHDAY",
    "WEDDING",
    "FUNERAL",
    "PUNCHLINE",
    "PYTHON",
    "BADDY",
    "CHASE",
    "BA_DING",
    "WAWAWAWAA",
    "JUMP_UP",
    "JUMP_DOWN",
    "POWER_UP",
    "POWER_DOWN",
];

const PINS: &[&str] = &["0", "1", "2"];

/// Defines the single-line (and simple header) statements of the built-in catalog.
///
/// Each entry expands to a `TemplateOperation`; the order of entries is their
/// match priority.
macro_rules! define_statements {
    ( $( $kind:literal => ($category:ident, $template:literal, [ $( $field:expr ),* $(,)? ], [ $( $import:expr ),* $(,)? ] $(, body = $body:literal)? $(,)? ) ),* $(,)? ) => {
        fn builtin_statements() -> Result<Vec<TemplateOperation>, CatalogError> {
            Ok(vec![
                $(
                    TemplateOperation::new($kind, Category::$category, $template, vec![ $( $field ),* ])?
                        .with_imports(&[ $( $import ),* ])
                        $( .with_body($body) )?
                ),*
            ])
        }

        /// Kinds defined by `define_statements!`, in priority order.
        pub const STATEMENT_KINDS: &[&str] = &[ $( $kind ),* ];
    };
}

define_statements! {
    // Loops
    "forever" => (LOOPS, "while True:", [], [MICROBIT], body = "DO"),
    "repeat_times" => (LOOPS, "for {VAR} in range({TIMES}):",
        [FieldSpec::identifier("VAR"), FieldSpec::integer("TIMES", 0.0, 10_000.0)], [MICROBIT], body = "DO"),
    "while_condition" => (LOOPS, "while {CONDITION}:", [condition_field("CONDITION")], [MICROBIT], body = "DO"),

    // Display
    "display_scroll" => (DISPLAY, "display.scroll({TEXT})", [FieldSpec::text("TEXT")], [MICROBIT]),
    "display_show_number" => (DISPLAY, "display.show({NUMBER})", [FieldSpec::number("NUMBER")], [MICROBIT]),
    "display_show_text" => (DISPLAY, "display.show({TEXT})", [FieldSpec::text("TEXT")], [MICROBIT]),
    "display_show_image" => (DISPLAY, "display.show(Image.{IMAGE})", [FieldSpec::choice("IMAGE", IMAGES)], [MICROBIT]),
    "display_clear" => (DISPLAY, "display.clear()", [], [MICROBIT]),
    "display_set_pixel" => (DISPLAY, "display.set_pixel({X}, {Y}, {BRIGHTNESS})",
        [FieldSpec::integer("X", 0.0, 4.0), FieldSpec::integer("Y", 0.0, 4.0), FieldSpec::integer("BRIGHTNESS", 0.0, 9.0)],
        [MICROBIT]),

    // Basic
    "sleep" => (BASIC, "sleep({MS})", [FieldSpec::integer("MS", 0.0, 3_600_000.0)], [MICROBIT]),

    // Pins
    "pin_write_digital" => (PINS, "pin{PIN}.write_digital({VALUE})",
        [FieldSpec::choice("PIN", PINS), FieldSpec::integer("VALUE", 0.0, 1.0)], [MICROBIT]),
    "pin_write_analog" => (PINS, "pin{PIN}.write_analog({VALUE})",
        [FieldSpec::choice("PIN", PINS), FieldSpec::integer("VALUE", 0.0, 1023.0)], [MICROBIT]),

    // Music
    "music_play" => (MUSIC, "music.play(music.{MELODY})", [FieldSpec::choice("MELODY", MELODIES)], [MICROBIT, MUSIC]),
    "music_pitch" => (MUSIC, "music.pitch({FREQUENCY}, {DURATION})",
        [FieldSpec::integer("FREQUENCY", 0.0, 20_000.0), FieldSpec::integer("DURATION", -1.0, 60_000.0)],
        [MICROBIT, MUSIC]),

    // Radio
    "radio_on" => (RADIO, "radio.on()", [], [MICROBIT, RADIO]),
    "radio_config_group" => (RADIO, "radio.config(group={GROUP})", [FieldSpec::integer("GROUP", 0.0, 255.0)], [MICROBIT, RADIO]),
    "radio_send" => (RADIO, "radio.send({TEXT})", [FieldSpec::text("TEXT")], [MICROBIT, RADIO]),
}

/// Builds every built-in operation in match-priority order.
///
/// Placeholders come first so that imports and `pass` are never claimed by a
/// statement pattern, then loops, the conditional and its arms, then the
/// single-line statements.
pub(crate) fn builtin_operations() -> Result<Vec<Box<dyn Operation>>, CatalogError> {
    let mut statements = builtin_statements()?.into_iter();
    let mut operations: Vec<Box<dyn Operation>> = vec![
        Box::new(PlaceholderOperation::imports()?),
        Box::new(PlaceholderOperation::pass()?),
    ];
    // The three loop headers lead the statement table.
    operations.extend(
        statements
            .by_ref()
            .take(3)
            .map(|op| Box::new(op) as Box<dyn Operation>),
    );
    operations.push(Box::new(IfElseOperation::new()?));
    operations.push(Box::new(ArmOperation::elif()?));
    operations.push(Box::new(ArmOperation::otherwise()?));
    operations.extend(statements.map(|op| Box::new(op) as Box<dyn Operation>));
    Ok(operations)
}

/// Creates a single built-in operation by its kind.
pub fn create_operation_by_kind(kind: &str) -> Option<Box<dyn Operation>> {
    builtin_operations()
        .ok()?
        .into_iter()
        .find(|op| op.kind() == kind)
}
