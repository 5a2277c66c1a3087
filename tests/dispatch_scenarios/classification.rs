//! Line classification as seen from the dispatcher.

use mgmt::{classify, ClassifiedLine};

#[test]
fn test_line_kinds() {
    assert_eq!(classify(""), ClassifiedLine::Empty);
    assert_eq!(classify("   \t "), ClassifiedLine::Empty);
    assert_eq!(
        classify(":read-resource"),
        ClassifiedLine::Operation(":read-resource")
    );
    assert_eq!(
        classify("./subsystem=logging:read-resource"),
        ClassifiedLine::Operation("./subsystem=logging:read-resource")
    );
    assert_eq!(classify(".."), ClassifiedLine::Navigation(".."));
    assert_eq!(
        classify("/subsystem=logging"),
        ClassifiedLine::Navigation("/subsystem=logging")
    );
    assert_eq!(
        classify("cd /x=y"),
        ClassifiedLine::Command {
            name: "cd",
            arguments: Some("/x=y"),
        }
    );
    assert_eq!(
        classify("batch"),
        ClassifiedLine::Command {
            name: "batch",
            arguments: None,
        }
    );
}
