use elu_net::{Example, Network};

fn main() -> elu_net::Result<()> {
    env_logger::init();

    let mut network = Network::new(&[2, 3, 1], 2024)?;

    let data = vec![
        Example::new(vec![0.0, 0.0], vec![0.0]),
        Example::new(vec![0.0, 1.0], vec![1.0]),
        Example::new(vec![1.0, 0.0], vec![1.0]),
        Example::new(vec![1.0, 1.0], vec![0.0]),
    ];

    let epochs = 10000;
    let errors = network.train(&data, epochs, 2, 0.1)?;

    for (epoch, error) in errors.iter().enumerate() {
        if epoch % 1000 == 0 || epoch == epochs - 1 {
            println!("Epoch {}: mean error = {error:.6}", epoch + 1);
        }
    }

    for example in &data {
        let output = network.forward(&example.inputs)?;
        println!("Input: {:?} -> Output: {:.4}", example.inputs, output[0]);
    }

    Ok(())
}
