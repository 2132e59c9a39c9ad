use elu_net::{LayerRole, Network};

fn main() -> elu_net::Result<()> {
    let network = Network::new(&[2, 3, 1], 0)?;

    println!("elu-net: ELU hidden layers, sigmoid output, mini-batch SGD on squared error.");
    println!("XOR demo topology {:?}:", network.layer_sizes());
    for (i, layer) in network.layers().iter().enumerate() {
        let role = match layer.role() {
            LayerRole::Input => "input",
            LayerRole::Hidden => "hidden (ELU, He init)",
            LayerRole::Output => "output (sigmoid, Xavier init)",
        };
        println!("  layer {i}: {} neuron(s), fan-in {}, {role}", layer.size, layer.input_size);
    }
    println!("Run `cargo run --example xor` to train it.");
    Ok(())
}
