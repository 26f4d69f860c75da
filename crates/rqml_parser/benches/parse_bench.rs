use bumpalo::Bump;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rqml_options::ParseOptions;
use rqml_parser::{parse, tokenize};

// A medium-size QML document with most member kinds and some script
const QML_SOURCE: &str = r#"
import QtQuick 2.5
import QtQuick.Controls 1.4 as Controls
import "components"

Rectangle {
    id: window
    width: 640
    height: 480
    color: "#202020"

    property int clicks: 0
    property string title: "Counter"
    readonly property bool busy: clicks > 10
    property list<Item> overlays
    default property alias content: column.children

    signal reset(int value, string reason)
    signal closed

    function increment(step) {
        var next = clicks + (step || 1);
        if (next > 100) {
            reset(0, "overflow");
            return;
        }
        clicks = next;
    }

    function describe() {
        var parts = [];
        for (var i = 0; i < overlays.length; i++) {
            parts.push(overlays[i].objectName);
        }
        return title + ": " + parts.join(", ");
    }

    onReset: {
        clicks = value;
        console.log("reset because " + reason);
    }

    Column {
        id: column
        anchors.fill: parent
        anchors.margins: 8
        spacing: 4

        Text {
            text: window.title + " (" + window.clicks + ")"
            font.pixelSize: 18
            color: window.busy ? "red" : "white"
        }

        Controls.Button {
            text: "Click"
            onClicked: window.increment(1)
        }

        Controls.Button {
            text: "Reset"
            enabled: window.clicks !== 0
            onClicked: {
                window.reset(0, "button");
            }
        }

        Repeater {
            model: 5
            delegate: Rectangle {
                width: 20; height: 20
                color: index % 2 === 0 ? "steelblue" : "gray"
            }
        }
    }

    MouseArea {
        anchors.fill: parent
        onDoubleClicked: {
            switch (mouse.button) {
            case Qt.LeftButton: window.increment(2); break;
            default: window.closed();
            }
        }
    }
}
"#;

fn bench_parse_qml(c: &mut Criterion) {
    let strict = ParseOptions::default();
    let loose = ParseOptions::loose();

    c.bench_function("parse_qml_strict", |b| {
        b.iter(|| {
            let arena = Bump::new();
            let program = parse(black_box(QML_SOURCE), &strict, &arena);
            black_box(program.is_ok());
        });
    });

    c.bench_function("parse_qml_loose", |b| {
        b.iter(|| {
            let arena = Bump::new();
            let program = parse(black_box(QML_SOURCE), &loose, &arena);
            black_box(program.is_ok());
        });
    });

    // Truncated input exercises the recovery paths
    let truncated = &QML_SOURCE[..QML_SOURCE.len() / 2];
    c.bench_function("parse_qml_loose_truncated", |b| {
        b.iter(|| {
            let arena = Bump::new();
            let program = parse(black_box(truncated), &loose, &arena);
            black_box(program.is_ok());
        });
    });

    c.bench_function("tokenize_qml", |b| {
        b.iter(|| black_box(tokenize(black_box(QML_SOURCE), &strict).map(|tokens| tokens.len())));
    });
}

criterion_group!(benches, bench_parse_qml);
criterion_main!(benches);
