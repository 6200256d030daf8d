//! Benchmarks for triplekit parsing and identifier operations

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use triplekit::{Iri, NTriplesParser, RdfXmlParser, TripleCollector};

fn ntriples_document(people: usize) -> String {
    let mut doc = String::new();
    for i in 0..people {
        doc.push_str(&format!(
            "<http://example.org/person/{i}> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://xmlns.com/foaf/0.1/Person> .\n\
             <http://example.org/person/{i}> <http://xmlns.com/foaf/0.1/name> \"Person \\\"{i}\\\"\"@en .\n\
             <http://example.org/person/{i}> <http://example.org/age> \"{age}\"^^<http://www.w3.org/2001/XMLSchema#int> .\n\
             <http://example.org/person/{i}> <http://example.org/address> _:a{i} .\n\
             _:a{i} <http://example.org/city> \"Oslo\" .\n",
            age = 20 + i % 50
        ));
    }
    doc
}

fn rdfxml_document(people: usize) -> String {
    let mut doc = String::from(
        "<?xml version=\"1.0\"?>\n<rdf:RDF xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\" \
         xmlns:foaf=\"http://xmlns.com/foaf/0.1/\" xmlns:ex=\"http://example.org/\">\n",
    );
    for i in 0..people {
        doc.push_str(&format!(
            "  <foaf:Person rdf:about=\"http://example.org/person/{i}\">\n\
             \x20   <foaf:name xml:lang=\"en\">Person {i}</foaf:name>\n\
             \x20   <ex:age rdf:datatype=\"http://www.w3.org/2001/XMLSchema#int\">{age}</ex:age>\n\
             \x20   <ex:address rdf:parseType=\"Resource\"><ex:city>Oslo</ex:city></ex:address>\n\
             \x20 </foaf:Person>\n",
            age = 20 + i % 50
        ));
    }
    doc.push_str("</rdf:RDF>\n");
    doc
}

fn ntriples_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_ntriples");

    for people in [10, 1000] {
        let doc = ntriples_document(people);
        group.bench_with_input(BenchmarkId::new("whole", people * 5), &doc, |b, input| {
            b.iter(|| {
                let mut collector = TripleCollector::new();
                NTriplesParser::new().parse_str(input, &mut collector).unwrap();
                black_box(collector.len())
            });
        });
        group.bench_with_input(BenchmarkId::new("chunks_of_64", people * 5), &doc, |b, input| {
            b.iter(|| {
                let mut collector = TripleCollector::new();
                NTriplesParser::new()
                    .parse_reader(input.as_bytes(), 64, &mut collector)
                    .unwrap();
                black_box(collector.len())
            });
        });
    }

    group.finish();
}

fn rdfxml_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_rdfxml");

    for people in [10, 1000] {
        let doc = rdfxml_document(people);
        group.bench_with_input(BenchmarkId::new("collector", people * 5), &doc, |b, input| {
            b.iter(|| {
                let mut collector = TripleCollector::new();
                RdfXmlParser::new().parse_str(input, &mut collector).unwrap();
                black_box(collector.len())
            });
        });
        group.bench_with_input(BenchmarkId::new("graph", people * 5), &doc, |b, input| {
            b.iter(|| black_box(triplekit::parse_rdfxml(input).unwrap().triple_count()));
        });
    }

    group.finish();
}

fn iri_benchmark(c: &mut Criterion) {
    let base = Iri::parse("http://a/b/c/d;p?q").unwrap();
    let references = ["g", "./g/", "../../g", "?y", "#s", "g;x?y#s", "../../../../g", "//g"];

    let mut group = c.benchmark_group("iri");

    group.bench_function("parse", |b| {
        b.iter(|| black_box(Iri::parse("http://example.org/a/b/../c?q=1#frag").unwrap()));
    });

    group.bench_function("resolve", |b| {
        b.iter(|| {
            for reference in &references {
                black_box(base.resolve_str(reference).unwrap());
            }
        });
    });

    let targets: Vec<Iri> = references
        .iter()
        .map(|reference| base.resolve_str(reference).unwrap())
        .collect();
    group.bench_function("relativize", |b| {
        b.iter(|| {
            for target in &targets {
                black_box(base.relativize(target));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, ntriples_benchmark, rdfxml_benchmark, iri_benchmark);
criterion_main!(benches);
