// benches/scan.rs
use criterion::{criterion_group, criterion_main, Criterion, black_box};

use flyontime::{core::Document, extract};

// One card of the results list; airlines rotate so every verdict path gets hit.
fn card(i: usize) -> String {
    let (airline, endpoints, connections) = match i % 4 {
        0 => ("Delta", "JFK–LAX", "<div>Nonstop</div><div>5 hr 15 min</div>"),
        1 => ("Southwest", "MDW–LAS", "<div>1 stop</div><div>55 min DEN</div>"),
        2 => ("Delta, WestJet", "SEA–YVR", "<div>Nonstop</div>"),
        _ => ("United", "ORD–SFO", "<div>2 stops</div><div>DEN, SLC</div>"),
    };
    let hour = 1 + i % 12;
    format!(
        "<li><div><div></div><div><div><div></div><div><div>\
         <div>logo</div><div><div>{hour}:05 AM – {hour}:55 PM</div><div>{airline}</div></div>\
         <div><span>{endpoints}</span></div><div>{connections}</div><div>140 kg CO2</div><div>$199</div>\
         </div></div></div></div></div>\
         <div><div><button>Select</button></div></div><div><div><button>Details</button></div></div></li>"
    )
}

fn synthetic_page(cards: usize) -> String {
    let mut html = String::from(
        "<html><body><input aria-label=\"Departure\" value=\"Fri, Mar 7\">\
         <ul></ul><ul></ul><ul></ul><ul></ul><div><h3>Departing flights</h3></div><ul>",
    );
    for i in 0..cards {
        html.push_str(&card(i));
    }
    html.push_str("</ul><ul></ul></body></html>");
    html
}

fn bench_scan(c: &mut Criterion) {
    let html = synthetic_page(200);

    c.bench_function("parse_200", |b| {
        b.iter(|| black_box(Document::parse(black_box(&html))))
    });

    let doc = Document::parse(&html);
    c.bench_function("scan_200", |b| {
        b.iter(|| {
            let report = extract::scan(black_box(&doc));
            black_box(report.count_eligible())
        })
    });
}

criterion_group!(benches, bench_scan);
criterion_main!(benches);
